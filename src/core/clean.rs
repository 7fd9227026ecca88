//! Clean logic
//!
//! Starts a fresh logical SDK build. Removing only the checkpoint makes
//! every package build again on top of the existing SDK tree; a full clean
//! also removes the SDK tree. Source checkouts are always kept.

use std::path::PathBuf;

use crate::core::config::Layout;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// What to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanScope {
    /// Checkpoint file only
    CheckpointOnly,
    /// Checkpoint file and SDK root
    Sdk,
}

/// Result of clean operation
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Paths that were removed
    pub removed: Vec<PathBuf>,
    /// Paths that didn't exist (skipped)
    pub skipped: Vec<PathBuf>,
}

/// Remove build state according to `scope`
pub fn clean_build(layout: &Layout, scope: CleanScope) -> Result<CleanResult, FilesystemError> {
    let mut result = CleanResult::default();

    let checkpoint = &layout.checkpoint_path;
    if filesystem::entry_exists(checkpoint) {
        filesystem::remove_file(checkpoint)?;
        result.removed.push(checkpoint.clone());
    } else {
        result.skipped.push(checkpoint.clone());
    }

    if scope == CleanScope::Sdk {
        let sdk = &layout.sdk_root;
        if sdk.exists() {
            filesystem::remove_dir_all(sdk)?;
            result.removed.push(sdk.clone());
        } else {
            result.skipped.push(sdk.clone());
        }
    }

    Ok(result)
}

/// Whether there is any build state to clean
pub fn has_build_state(layout: &Layout) -> bool {
    layout.checkpoint_path.exists() || layout.sdk_root.exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SdkConfig;
    use std::fs;
    use tempfile::TempDir;

    fn layout_with_state() -> (TempDir, Layout) {
        let temp = TempDir::new().unwrap();
        let layout = Layout::from_config(&SdkConfig::default(), temp.path());
        fs::create_dir_all(layout.sdk_root.join("usr/include")).unwrap();
        fs::create_dir_all(&layout.monorepo_dir).unwrap();
        fs::write(&layout.checkpoint_path, "[\"dyld\"]").unwrap();
        (temp, layout)
    }

    #[test]
    fn test_checkpoint_only_keeps_sdk() {
        let (_temp, layout) = layout_with_state();

        let result = clean_build(&layout, CleanScope::CheckpointOnly).unwrap();

        assert!(!layout.checkpoint_path.exists());
        assert!(layout.sdk_root.exists());
        assert_eq!(result.removed, vec![layout.checkpoint_path.clone()]);
    }

    #[test]
    fn test_full_clean_keeps_sources() {
        let (_temp, layout) = layout_with_state();

        let result = clean_build(&layout, CleanScope::Sdk).unwrap();

        assert!(!layout.checkpoint_path.exists());
        assert!(!layout.sdk_root.exists());
        assert!(layout.monorepo_dir.exists());
        assert_eq!(result.removed.len(), 2);
        assert!(!has_build_state(&layout));
    }

    #[test]
    fn test_clean_nothing() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::from_config(&SdkConfig::default(), temp.path());

        let result = clean_build(&layout, CleanScope::Sdk).unwrap();

        assert!(result.removed.is_empty());
        assert_eq!(result.skipped.len(), 2);
    }
}
