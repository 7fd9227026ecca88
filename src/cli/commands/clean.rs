//! CLI implementation for `ossdk clean`

use anyhow::{Context, Result};

use crate::cli::commands::Session;
use crate::cli::output::{print_detail, print_success};
use crate::core::clean::{clean_build, has_build_state, CleanScope};

/// Execute the clean command
pub fn execute(session: &Session, checkpoint_only: bool) -> Result<()> {
    if !has_build_state(&session.layout) {
        print_success("Nothing to clean");
        return Ok(());
    }

    let scope = if checkpoint_only {
        CleanScope::CheckpointOnly
    } else {
        CleanScope::Sdk
    };
    let result = clean_build(&session.layout, scope).context("Failed to clean build state")?;

    if result.removed.is_empty() {
        print_success("Nothing to clean");
    } else {
        print_success("Cleaned build state:");
        for path in &result.removed {
            print_detail(&format!("Removed {}", path.display()));
        }
    }
    Ok(())
}
