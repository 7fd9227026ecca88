//! Check command implementation
//!
//! Implements `ossdk check` to validate configuration without building.

use anyhow::{bail, Result};

use crate::cli::commands::Session;
use crate::cli::output::{is_quiet, print_detail, print_success, status};
use crate::core::check;
use crate::packages;

/// Execute the check command
pub fn execute(session: &Session) -> Result<()> {
    let catalog = session.catalog()?;
    let report = check::check(
        &catalog,
        &packages::builtin_registry(),
        &session.config,
        &session.layout,
    );

    for error in &report.errors {
        eprintln!("{} {error}", status::ERROR);
    }
    if !is_quiet() {
        for warning in &report.warnings {
            println!("{} {warning}", status::WARNING);
        }
    }

    if !report.is_valid() {
        bail!("Check failed with {} error(s)", report.errors.len());
    }

    print_success(&format!(
        "Catalog is valid ({} packages, macOS {})",
        catalog.len(),
        session.config.sdk_version()
    ));
    print_detail(&format!("SDK root: {}", session.layout.sdk_root.display()));
    print_detail(&format!(
        "{} built, {} to build",
        report.built.len(),
        report.pending.len()
    ));
    Ok(())
}
