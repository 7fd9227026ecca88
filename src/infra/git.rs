//! Git source acquisition
//!
//! Clones with the gix crate; checkout of the release tag, submodule
//! initialisation and the per-package reset/clean go through the `git`
//! binary via the process runner.

use gix::remote::fetch::Shallow;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::core::catalog::Package;
use crate::core::config::Layout;
use crate::core::source::SourceProvider;
use crate::error::SourceError;
use crate::infra::filesystem;
use crate::infra::process::{CommandSpec, ProcessRunner};

/// Clone depth for the source trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneDepth {
    /// Only the tip commit
    Shallow,
    /// Complete history, needed to check out a release tag
    Full,
}

/// Clone `url` into `dest`
///
/// Clones into a sibling `.partial` directory first so an interrupted clone
/// is never mistaken for a finished one.
pub fn clone_repo(url: &str, dest: &Path, depth: CloneDepth) -> Result<PathBuf, SourceError> {
    let partial = partial_path(dest);
    filesystem::remove_dir_all(&partial)?;
    if let Some(parent) = dest.parent() {
        filesystem::create_dir_all(parent)?;
    }

    clone_internal(url, &partial, depth)?;
    rename_into_place(&partial, dest)?;
    Ok(dest.to_path_buf())
}

fn clone_internal(url: &str, dest: &Path, depth: CloneDepth) -> Result<(), SourceError> {
    let clone_err = |e: &dyn std::fmt::Display| SourceError::CloneFailed {
        url: url.to_string(),
        error: e.to_string(),
    };

    let mut prepare = gix::prepare_clone(url, dest).map_err(|e| clone_err(&e))?;
    if depth == CloneDepth::Shallow {
        prepare = prepare.with_shallow(Shallow::DepthAtRemote(NonZeroU32::MIN));
    }

    let (mut checkout, _outcome) = prepare
        .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(|e| clone_err(&e))?;

    let (repo, _outcome) = checkout
        .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(|e| clone_err(&e))?;

    if let Ok(head) = repo.head_id() {
        tracing::debug!("Cloned {url} at {}", head.to_hex());
    }
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    dest.with_file_name(name)
}

fn rename_into_place(from: &Path, to: &Path) -> Result<(), SourceError> {
    std::fs::rename(from, to).map_err(|e| {
        SourceError::Filesystem(crate::error::FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })
    })
}

/// Resolve the commit a checkout is at, for logging
pub fn head_commit(repo_path: &Path) -> Option<String> {
    let repo = gix::open(repo_path).ok()?;
    let id = repo.head_id().ok()?;
    Some(id.to_hex().to_string())
}

/// Source provider backed by the monorepo plus per-package clones
pub struct GitSources<R: ProcessRunner> {
    layout: Layout,
    distribution_repo: String,
    distribution_tag: String,
    runner: R,
}

impl<R: ProcessRunner> GitSources<R> {
    /// Create a provider rooted at `layout.build_root`
    pub fn new(
        layout: Layout,
        distribution_repo: impl Into<String>,
        distribution_tag: impl Into<String>,
        runner: R,
    ) -> Self {
        Self {
            layout,
            distribution_repo: distribution_repo.into(),
            distribution_tag: distribution_tag.into(),
            runner,
        }
    }

    fn git(&self, dir: &Path, args: &[&str]) -> Result<(), SourceError> {
        let spec = CommandSpec::new("git").args(args.iter().copied()).current_dir(dir);
        self.runner.run(&spec)?;
        Ok(())
    }

    /// Clone the monorepo at the release tag unless it is already present
    fn ensure_monorepo(&self) -> Result<(), SourceError> {
        let dest = &self.layout.monorepo_dir;
        if dest.exists() {
            return Ok(());
        }

        tracing::info!("Cloning {}", self.distribution_repo);
        let partial = partial_path(dest);
        filesystem::remove_dir_all(&partial)?;
        filesystem::create_dir_all(&self.layout.build_root)?;
        clone_internal(&self.distribution_repo, &partial, CloneDepth::Full)?;

        tracing::info!("Updating submodules at {}", self.distribution_tag);
        self.git(&partial, &["checkout", &self.distribution_tag])?;
        self.git(&partial, &["submodule", "update", "--init", "--depth", "1"])?;

        rename_into_place(&partial, dest)
    }
}

impl<R: ProcessRunner> SourceProvider for GitSources<R> {
    fn prepare(&self, package: &Package) -> Result<PathBuf, SourceError> {
        let dir = self.source_path(package);

        match package.alternate_repo {
            Some(ref url) => {
                if !dir.exists() {
                    tracing::info!("Cloning {url}");
                    clone_repo(url, &dir, CloneDepth::Shallow)?;
                }
            }
            None => {
                self.ensure_monorepo()?;
                if !dir.is_dir() {
                    return Err(SourceError::MissingSource {
                        package: package.name.clone(),
                        path: dir,
                    });
                }
            }
        }

        self.git(&dir, &["reset", "--hard", "HEAD"])?;
        self.git(&dir, &["clean", "-x", "-f", "-d"])?;

        if let Some(sha) = head_commit(&dir) {
            tracing::debug!("{} at {sha}", package.name);
        }
        Ok(dir)
    }

    fn source_path(&self, package: &Package) -> PathBuf {
        match package.alternate_repo {
            Some(ref url) => self.layout.alternate_repo_dir(url),
            None => self.layout.monorepo_dir.join(&package.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SdkConfig;
    use crate::infra::process::SystemRunner;
    use std::fs;
    use tempfile::TempDir;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn sh_git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "t")
            .env("GIT_AUTHOR_EMAIL", "t@example.com")
            .env("GIT_COMMITTER_NAME", "t")
            .env("GIT_COMMITTER_EMAIL", "t@example.com")
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn init_repo(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        sh_git(dir, &["init", "-q"]);
        fs::write(dir.join("dyld.h"), "original\n").unwrap();
        sh_git(dir, &["add", "."]);
        sh_git(dir, &["commit", "-q", "-m", "init"]);
    }

    fn sources(temp: &TempDir) -> GitSources<SystemRunner> {
        let layout = Layout::from_config(&SdkConfig::default(), temp.path());
        GitSources::new(layout, "https://example.invalid/distribution-macOS", "macos-144", SystemRunner)
    }

    #[test]
    fn test_source_path_selection() {
        let temp = TempDir::new().unwrap();
        let sources = sources(&temp);

        let mono = Package::new("dyld");
        let alt = Package::new("Libm").with_alternate_repo("https://github.com/apple-oss-distributions/Libm");

        assert_eq!(
            sources.source_path(&mono),
            temp.path().join("sdk-build/distribution-macOS/dyld")
        );
        assert_eq!(sources.source_path(&alt), temp.path().join("sdk-build/Libm"));
    }

    #[test]
    fn test_prepare_resets_existing_checkout() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let sources = sources(&temp);
        let pkg = Package::new("Libm").with_alternate_repo("https://example.invalid/Libm");
        let dir = sources.source_path(&pkg);
        init_repo(&dir);

        fs::write(dir.join("dyld.h"), "patched\n").unwrap();
        fs::write(dir.join("untracked.o"), "junk").unwrap();

        let prepared = sources.prepare(&pkg).unwrap();

        assert_eq!(prepared, dir);
        assert_eq!(fs::read_to_string(dir.join("dyld.h")).unwrap(), "original\n");
        assert!(!dir.join("untracked.o").exists());
    }

    #[test]
    fn test_prepare_missing_monorepo_package() {
        let temp = TempDir::new().unwrap();
        let sources = sources(&temp);
        fs::create_dir_all(temp.path().join("sdk-build/distribution-macOS")).unwrap();

        let err = sources.prepare(&Package::new("nonexistent")).unwrap_err();
        assert!(matches!(err, SourceError::MissingSource { .. }));
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/b/distribution-macOS")),
            PathBuf::from("/b/distribution-macOS.partial")
        );
    }
}
