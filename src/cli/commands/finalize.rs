//! Finalize command implementation

use anyhow::Result;

use crate::cli::commands::Session;
use crate::cli::output::{create_spinner, print_detail, print_success};
use crate::core::finalize::{FinalizeOptions, Finalizer};

/// Execute the finalize command
pub async fn execute(session: &Session) -> Result<()> {
    let config = &session.config;
    let options = FinalizeOptions {
        sdk_root: session.layout.sdk_root.clone(),
        reference_sdk: session.layout.reference_sdk.clone(),
        header_url: config.compat_header_url().to_string(),
        header_sha256: config.compat_header_sha256.clone(),
        excluded_lib_subtrees: config.excluded_lib_subtrees(),
    };

    let spinner = create_spinner("Finalizing SDK...");
    let result = Finalizer::new(options).run().await;
    spinner.finish_and_clear();
    let report = result?;

    print_success(&format!("SDK ready at {}", session.layout.sdk_root.display()));
    print_detail(&format!("Header: {}", report.header.display()));
    print_detail(&format!("Stubs copied: {}", report.stubs_copied));
    for path in &report.removed_subtrees {
        print_detail(&format!("Removed {}", path.display()));
    }
    if !report.pruned_links.is_empty() {
        print_detail(&format!("Pruned {} dangling links", report.pruned_links.len()));
    }
    Ok(())
}
