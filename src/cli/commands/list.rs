//! List command implementation
//!
//! Prints the catalog in build order with each package's checkpoint status.

use anyhow::Result;

use crate::cli::commands::Session;
use crate::cli::output::{is_quiet, status};
use crate::core::checkpoint::{CheckpointStore, JsonCheckpointStore};

/// Execute the list command
pub fn execute(session: &Session) -> Result<()> {
    let catalog = session.catalog()?;
    let done = JsonCheckpointStore::new(&session.layout.checkpoint_path).load()?;

    if is_quiet() {
        return Ok(());
    }

    for pkg in catalog.ordered() {
        let mark = if done.contains(&pkg.name) {
            status::SUCCESS
        } else {
            status::PENDING
        };
        let mut line = format!("{mark} {}", pkg.name);
        if let Some(ref hook) = pkg.hook {
            line.push_str(&format!(" [{hook}]"));
        }
        if !pkg.dependencies.is_empty() {
            line.push_str(&format!(" <- {}", pkg.dependencies.join(", ")));
        }
        println!("{line}");
    }

    let built = catalog
        .ordered()
        .iter()
        .filter(|p| done.contains(&p.name))
        .count();
    println!("\n{built}/{} packages built", catalog.len());
    Ok(())
}
