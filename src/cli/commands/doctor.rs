//! CLI command for `ossdk doctor`
//!
//! Checks host tools and the reference SDK and reports issues with
//! suggestions.

use anyhow::Result;

use crate::cli::commands::Session;
use crate::cli::output::{is_quiet, print_detail, print_info, print_success, print_warning, status};
use crate::core::doctor::run_doctor;

/// Execute the doctor command
pub fn execute(session: &Session) -> Result<()> {
    let report = run_doctor(&session.layout.reference_sdk);

    if is_quiet() {
        let failed_required = report.failed_required();
        if !failed_required.is_empty() {
            for check in failed_required {
                eprintln!("{} Missing required: {}", status::ERROR, check.name);
            }
            anyhow::bail!("Missing required dependencies");
        }
        return Ok(());
    }

    print_info("Checking system dependencies...");
    println!();

    for check in &report.checks {
        let required_str = if check.required { "" } else { " [optional]" };
        if check.passed {
            let location = check
                .location
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default();
            println!("  {} {}{location}{required_str}", status::SUCCESS, check.name);
        } else {
            println!("  {} {}{required_str}", status::ERROR, check.name);
            if let Some(error) = &check.error {
                print_detail(&format!("Error: {error}"));
            }
            if let Some(suggestion) = &check.suggestion {
                print_detail(&format!("Suggestion: {suggestion}"));
            }
        }
    }

    println!();
    let passed = report.passed_count();
    let total = report.checks.len();
    let failed_required = report.failed_required();

    if report.failed_count() == 0 {
        print_success(&format!("All checks passed ({passed}/{total})"));
    } else if failed_required.is_empty() {
        print_warning(&format!(
            "{passed}/{total} checks passed (optional dependencies missing)"
        ));
    } else {
        println!("{} {passed}/{total} checks passed", status::ERROR);
        anyhow::bail!("Missing required dependencies. Run 'ossdk doctor' for details.");
    }
    Ok(())
}
