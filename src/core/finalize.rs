//! SDK finalization
//!
//! Runs once every package is built:
//!
//! 1. fetch the platform-compatibility header into `usr/include`
//! 2. merge the reference SDK's `.tbd` stubs (and directories) into `usr/lib`
//! 3. drop library subtrees that do not belong in the SDK
//! 4. prune symlinks under `usr/lib` left dangling by steps 2 and 3
//!
//! Each step is safe to repeat, so finalize can be re-run after a failure.

use std::path::PathBuf;

use crate::config::defaults;
use crate::error::FinalizeError;
use crate::infra::download::DownloadManager;
use crate::infra::filesystem;

/// Inputs for a finalize pass
#[derive(Debug, Clone)]
pub struct FinalizeOptions {
    /// The assembled SDK
    pub sdk_root: PathBuf,
    /// Installed reference SDK
    pub reference_sdk: PathBuf,
    /// Where to fetch the compatibility header from
    pub header_url: String,
    /// Expected SHA256 of the header
    pub header_sha256: Option<String>,
    /// `usr/lib` subtrees to delete
    pub excluded_lib_subtrees: Vec<String>,
}

/// What a finalize pass did
#[derive(Debug, Clone, Default)]
pub struct FinalizeReport {
    /// Path the header was written to
    pub header: PathBuf,
    /// Stub files and links copied from the reference SDK
    pub stubs_copied: usize,
    /// Subtrees that existed and were removed
    pub removed_subtrees: Vec<PathBuf>,
    /// Dangling links deleted
    pub pruned_links: Vec<PathBuf>,
}

/// Post-build SDK fixups
#[derive(Debug, Clone)]
pub struct Finalizer {
    options: FinalizeOptions,
    downloader: DownloadManager,
}

impl Finalizer {
    /// Finalizer with the default download manager
    pub fn new(options: FinalizeOptions) -> Self {
        Self::with_downloader(options, DownloadManager::new())
    }

    /// Finalizer with a custom download manager
    pub fn with_downloader(options: FinalizeOptions, downloader: DownloadManager) -> Self {
        Self {
            options,
            downloader,
        }
    }

    /// Run every step in order
    pub async fn run(&self) -> Result<FinalizeReport, FinalizeError> {
        let header = self.fetch_header().await?;
        let stubs_copied = self.copy_stubs()?;
        let removed_subtrees = self.remove_excluded()?;
        let pruned_links = self.prune_links()?;

        Ok(FinalizeReport {
            header,
            stubs_copied,
            removed_subtrees,
            pruned_links,
        })
    }

    /// Download the compatibility header into the SDK
    pub async fn fetch_header(&self) -> Result<PathBuf, FinalizeError> {
        let dest = self.options.sdk_root.join(defaults::COMPAT_HEADER_PATH);
        let url = &self.options.header_url;

        tracing::info!("Fetching {url}");
        match self.options.header_sha256 {
            Some(ref sha) => self.downloader.download_verified(url, &dest, sha).await?,
            None => self.downloader.download(url, &dest).await?,
        };
        Ok(dest)
    }

    /// Merge stub descriptors from the reference SDK into `usr/lib`
    pub fn copy_stubs(&self) -> Result<usize, FinalizeError> {
        let src = self.options.reference_sdk.join(defaults::LIB_DIR);
        if !src.is_dir() {
            return Err(FinalizeError::ReferenceSdkMissing { path: src });
        }
        let dst = self.options.sdk_root.join(defaults::LIB_DIR);

        let copied = filesystem::copy_tree(&src, &dst, |entry| {
            entry.file_type().is_dir()
                || entry.path().is_dir()
                || entry
                    .file_name()
                    .to_string_lossy()
                    .ends_with(defaults::STUB_SUFFIX)
        })?;
        tracing::info!("Copied {copied} library stubs from {}", src.display());
        Ok(copied)
    }

    /// Delete the excluded subtrees; absent ones are skipped
    pub fn remove_excluded(&self) -> Result<Vec<PathBuf>, FinalizeError> {
        let lib = self.options.sdk_root.join(defaults::LIB_DIR);
        let mut removed = Vec::new();

        for subtree in &self.options.excluded_lib_subtrees {
            let path = lib.join(subtree);
            if !filesystem::entry_exists(&path) {
                continue;
            }
            if path.symlink_metadata().is_ok_and(|m| m.is_dir()) {
                filesystem::remove_dir_all(&path)?;
            } else {
                filesystem::remove_file(&path)?;
            }
            tracing::debug!("Removed {}", path.display());
            removed.push(path);
        }
        Ok(removed)
    }

    /// Delete symlinks under `usr/lib` whose target is gone
    pub fn prune_links(&self) -> Result<Vec<PathBuf>, FinalizeError> {
        let lib = self.options.sdk_root.join(defaults::LIB_DIR);
        if !lib.exists() {
            return Ok(Vec::new());
        }
        let pruned = filesystem::remove_dangling_symlinks(&lib)?;
        for link in &pruned {
            tracing::debug!("Pruned dangling link {}", link.display());
        }
        Ok(pruned)
    }
}
