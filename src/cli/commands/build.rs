//! Build command implementation
//!
//! Implements `ossdk build`: runs the orchestrator over the catalog and,
//! for a full run, finalizes the SDK afterwards.

use anyhow::{Context, Result};

use crate::cli::commands::{finalize, Session};
use crate::cli::output::{print_info, print_success, BuildProgress};
use crate::core::checkpoint::JsonCheckpointStore;
use crate::core::hooks::HookSettings;
use crate::core::materialize::Materializer;
use crate::core::orchestrator::Orchestrator;
use crate::infra::filesystem;
use crate::infra::git::GitSources;
use crate::infra::process::SystemRunner;
use crate::packages;

/// Execute the build command
pub async fn execute(session: &Session, only: &[String], skip_finalize: bool) -> Result<()> {
    let config = &session.config;
    let layout = &session.layout;

    let catalog = session.catalog()?;
    let hooks = packages::builtin_registry();
    let store = JsonCheckpointStore::new(&layout.checkpoint_path);
    let sources = GitSources::new(
        layout.clone(),
        config.distribution_repo(),
        config.distribution_tag(),
        SystemRunner,
    );
    let settings = HookSettings {
        sdk_version: config.sdk_version().to_string(),
        reference_sdk: layout.reference_sdk.clone(),
        patches_dir: layout.patches_dir.clone(),
    };

    filesystem::create_dir_all(&layout.sdk_root)
        .with_context(|| format!("Failed to create SDK root {}", layout.sdk_root.display()))?;
    tracing::info!(
        "Building macOS {} SDK in {}",
        config.sdk_version(),
        layout.sdk_root.display()
    );

    let progress = BuildProgress::new();
    let orchestrator = Orchestrator::new(
        &catalog,
        &hooks,
        &sources,
        &store,
        &SystemRunner,
        Materializer::new(&layout.sdk_root),
        settings,
    )
    .on_event(|event| progress.handle(event));

    // Hooks and git block for minutes at a time
    let result = tokio::task::block_in_place(|| orchestrator.run(only));
    progress.finish();
    let summary = result?;

    print_success(&format!(
        "Built {} packages ({} already built)",
        summary.built.len(),
        summary.skipped.len()
    ));

    if skip_finalize {
        return Ok(());
    }
    if !only.is_empty() {
        print_info("Selective build, skipping finalize; run 'ossdk finalize' when done");
        return Ok(());
    }
    finalize::execute(session).await
}
