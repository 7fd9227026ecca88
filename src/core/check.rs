//! Check command logic
//!
//! Validates the catalog, hook wiring and configuration, and reports what
//! a build would do, without touching sources or the SDK tree.

use crate::config::defaults;
use crate::core::catalog::Catalog;
use crate::core::checkpoint::{CheckpointStore, JsonCheckpointStore};
use crate::core::config::{Layout, SdkConfig};
use crate::core::hooks::HookRegistry;

/// Hook that needs the CoreFoundation patch series
const PATCHED_HOOK: &str = "corefoundation";

/// Result of the check operation
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Problems that would make a build fail
    pub errors: Vec<String>,
    /// Problems worth knowing about
    pub warnings: Vec<String>,
    /// Packages already checkpointed, in build order
    pub built: Vec<String>,
    /// Packages a build would process, in build order
    pub pending: Vec<String>,
}

impl CheckReport {
    /// Whether no errors were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check `catalog` against the hooks, the configuration and the checkpoint
pub fn check(
    catalog: &Catalog,
    hooks: &HookRegistry,
    config: &SdkConfig,
    layout: &Layout,
) -> CheckReport {
    let mut report = CheckReport::default();

    if let Err(e) = hooks.check_catalog(catalog) {
        report.errors.push(e.to_string());
    }

    let url = config.compat_header_url();
    if let Err(e) = reqwest::Url::parse(url) {
        report
            .errors
            .push(format!("compat_header_url '{url}' is not a valid URL: {e}"));
    }

    if let Some(ref sha) = config.compat_header_sha256 {
        if !is_sha256(sha) {
            report
                .errors
                .push(format!("compat_header_sha256 '{sha}' is not a SHA256 hex digest"));
        }
    }

    let lib = layout.reference_sdk.join(defaults::LIB_DIR);
    if !lib.is_dir() {
        report.warnings.push(format!(
            "Reference SDK library directory {} not found; finalize will fail",
            lib.display()
        ));
    }

    let needs_patches = catalog
        .ordered()
        .iter()
        .any(|p| p.hook.as_deref() == Some(PATCHED_HOOK));
    if needs_patches && !layout.patches_dir.is_dir() {
        report.warnings.push(format!(
            "Patch directory {} not found; CoreFoundation will fail to build",
            layout.patches_dir.display()
        ));
    }

    let done = match JsonCheckpointStore::new(&layout.checkpoint_path).load() {
        Ok(done) => done,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    for name in done.names() {
        if !catalog.contains(name) {
            report
                .warnings
                .push(format!("Checkpoint lists '{name}', which is not in the catalog"));
        }
    }

    for pkg in catalog.ordered() {
        if done.contains(&pkg.name) {
            report.built.push(pkg.name.clone());
        } else {
            report.pending.push(pkg.name.clone());
        }
    }

    report
}

fn is_sha256(s: &str) -> bool {
    hex::decode(s).is_ok_and(|bytes| bytes.len() == 32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{OutputGroup, Package};
    use crate::core::hooks::HookContext;
    use crate::error::HookError;
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Package::new("dyld").with_output(OutputGroup::new("usr/include").files(["dlfcn.h"])),
            Package::new("CoreFoundation")
                .with_hook(PATCHED_HOOK)
                .with_dependencies(["dyld"]),
        ])
        .unwrap()
    }

    fn hooks() -> HookRegistry {
        HookRegistry::new().with(PATCHED_HOOK, |_: &HookContext<'_>| -> Result<(), HookError> {
            Ok(())
        })
    }

    fn layout(temp: &TempDir, config: &SdkConfig) -> Layout {
        let layout = Layout::from_config(config, temp.path());
        fs::create_dir_all(layout.reference_sdk.join("usr/lib")).unwrap();
        fs::create_dir_all(&layout.patches_dir).unwrap();
        layout
    }

    fn local_config() -> SdkConfig {
        SdkConfig {
            reference_sdk: Some("ref".into()),
            ..SdkConfig::default()
        }
    }

    #[test]
    fn test_clean_setup_is_valid() {
        let temp = TempDir::new().unwrap();
        let config = local_config();
        let layout = layout(&temp, &config);

        let report = check(&catalog(), &hooks(), &config, &layout);

        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.pending, vec!["dyld", "CoreFoundation"]);
        assert!(report.built.is_empty());
    }

    #[test]
    fn test_missing_hook_is_error() {
        let temp = TempDir::new().unwrap();
        let config = local_config();
        let layout = layout(&temp, &config);

        let report = check(&catalog(), &HookRegistry::new(), &config, &layout);

        assert!(!report.is_valid());
        assert!(report.errors[0].contains(PATCHED_HOOK));
    }

    #[test]
    fn test_bad_checksum_is_error() {
        let temp = TempDir::new().unwrap();
        let config = SdkConfig {
            compat_header_sha256: Some("not-hex".to_string()),
            ..local_config()
        };
        let layout = layout(&temp, &config);

        let report = check(&catalog(), &hooks(), &config, &layout);

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("compat_header_sha256"));
    }

    #[test]
    fn test_checkpoint_status_and_stale_names() {
        let temp = TempDir::new().unwrap();
        let config = local_config();
        let layout = layout(&temp, &config);
        fs::create_dir_all(&layout.build_root).unwrap();
        fs::write(&layout.checkpoint_path, r#"["dyld", "zlib"]"#).unwrap();

        let report = check(&catalog(), &hooks(), &config, &layout);

        assert!(report.is_valid());
        assert_eq!(report.built, vec!["dyld"]);
        assert_eq!(report.pending, vec!["CoreFoundation"]);
        assert!(report.warnings.iter().any(|w| w.contains("'zlib'")));
    }

    #[test]
    fn test_corrupt_checkpoint_is_error() {
        let temp = TempDir::new().unwrap();
        let config = local_config();
        let layout = layout(&temp, &config);
        fs::create_dir_all(&layout.build_root).unwrap();
        fs::write(&layout.checkpoint_path, "{not json").unwrap();

        let report = check(&catalog(), &hooks(), &config, &layout);

        assert!(!report.is_valid());
    }

    #[test]
    fn test_missing_reference_sdk_and_patches_warn() {
        let temp = TempDir::new().unwrap();
        let config = local_config();
        let layout = Layout::from_config(&config, temp.path());

        let report = check(&catalog(), &hooks(), &config, &layout);

        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }
}
