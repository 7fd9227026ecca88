//! Output materialization
//!
//! Copies a package's declared outputs from its workspace into the SDK tree.
//! Glob matches keep their layout relative to the pattern's wildcard anchor,
//! so `out/usr/include/**/*.h` places `out/usr/include/sys/x.h` at
//! `<sdk_dir>/sys/x.h` no matter where in the workspace the build put it.
//!
//! Every declared input is resolved before the first write; a missing file,
//! a missing directory or a glob that matches nothing fails the package
//! without touching the SDK tree.

use std::path::{Component, Path, PathBuf};

use crate::core::catalog::{OutputGroup, Symlink};
use crate::error::{FilesystemError, MaterializeError};
use crate::infra::filesystem;

/// One resolved copy step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAction {
    /// Copy a single file or symlink
    File { from: PathBuf, to: PathBuf },
    /// Create an (empty) directory
    Dir { to: PathBuf },
    /// Merge a whole directory tree
    Tree { from: PathBuf, to: PathBuf },
}

/// Literal path prefix of a glob pattern
///
/// The segments before the first one containing a wildcard character.
pub fn glob_anchor(pattern: &str) -> PathBuf {
    pattern
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .take_while(|s| !s.contains(['*', '?', '[']))
        .collect()
}

/// Destination of a glob match relative to the group's SDK directory
///
/// `matched` is workspace-relative. Returns `None` when the match does not
/// sit under the pattern's anchor.
pub fn relocate(pattern: &str, matched: &Path) -> Option<PathBuf> {
    let anchor = glob_anchor(pattern);
    let normalized: PathBuf = matched
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let relative = normalized.strip_prefix(&anchor).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_path_buf())
}

/// Copies package outputs into one SDK root
#[derive(Debug, Clone)]
pub struct Materializer {
    sdk_root: PathBuf,
}

impl Materializer {
    /// Materializer writing under `sdk_root`
    pub fn new(sdk_root: impl Into<PathBuf>) -> Self {
        Self {
            sdk_root: sdk_root.into(),
        }
    }

    /// The SDK root
    pub fn sdk_root(&self) -> &Path {
        &self.sdk_root
    }

    /// Resolve every group against `workspace` without writing anything
    pub fn plan(
        &self,
        workspace: &Path,
        groups: &[OutputGroup],
    ) -> Result<Vec<CopyAction>, MaterializeError> {
        let mut actions = Vec::new();

        for group in groups {
            let dest_dir = self.sdk_root.join(&group.sdk_dir);

            for file in &group.files {
                let from = workspace.join(file);
                if !filesystem::entry_exists(&from) {
                    return Err(MaterializeError::MissingFile { path: from });
                }
                let Some(name) = from.file_name() else {
                    return Err(MaterializeError::MissingFile { path: from });
                };
                actions.push(CopyAction::File {
                    to: dest_dir.join(name),
                    from,
                });
            }

            for pattern in &group.globs {
                for matched in expand_glob(workspace, pattern)? {
                    let relative = matched.strip_prefix(workspace).unwrap_or(&matched);
                    let Some(rel_dest) = relocate(pattern, relative) else {
                        continue;
                    };
                    let to = dest_dir.join(rel_dest);
                    if matched.is_dir() {
                        actions.push(CopyAction::Dir { to });
                    } else {
                        actions.push(CopyAction::File { from: matched, to });
                    }
                }
            }

            if let Some(ref dir) = group.directory {
                let from = workspace.join(dir);
                if !from.is_dir() {
                    return Err(MaterializeError::MissingDirectory { path: from });
                }
                let Some(name) = from.file_name() else {
                    return Err(MaterializeError::MissingDirectory { path: from });
                };
                actions.push(CopyAction::Tree {
                    to: dest_dir.join(name),
                    from,
                });
            }
        }

        Ok(actions)
    }

    /// Copy all groups into the SDK root; returns the number of actions run
    pub fn apply(&self, workspace: &Path, groups: &[OutputGroup]) -> Result<usize, MaterializeError> {
        let actions = self.plan(workspace, groups)?;
        for action in &actions {
            execute(action)?;
        }
        Ok(actions.len())
    }

    /// Create the catalog's symlinks; an existing entry at a link path is fatal
    pub fn create_symlinks(&self, links: &[Symlink]) -> Result<(), MaterializeError> {
        for spec in links {
            let dir = self.sdk_root.join(&spec.dir);
            filesystem::create_dir_all(&dir).map_err(|e| io_err(&dir, &e))?;

            let link = dir.join(&spec.link);
            if filesystem::entry_exists(&link) {
                return Err(MaterializeError::SymlinkExists { path: link });
            }
            filesystem::symlink(Path::new(&spec.target), &link).map_err(|e| io_err(&link, &e))?;
            tracing::debug!("Linked {} -> {}", link.display(), spec.target);
        }
        Ok(())
    }
}

fn execute(action: &CopyAction) -> Result<(), MaterializeError> {
    match action {
        CopyAction::File { from, to } => {
            if let Some(parent) = to.parent() {
                filesystem::create_dir_all(parent).map_err(|e| io_err(parent, &e))?;
            }
            filesystem::copy_file(from, to).map_err(|e| io_err(to, &e))
        }
        CopyAction::Dir { to } => filesystem::create_dir_all(to).map_err(|e| io_err(to, &e)),
        CopyAction::Tree { from, to } => filesystem::copy_tree(from, to, |_| true)
            .map(|_| ())
            .map_err(|e| io_err(to, &e)),
    }
}

fn io_err(path: &Path, error: &FilesystemError) -> MaterializeError {
    MaterializeError::Io {
        path: path.to_path_buf(),
        error: error.to_string(),
    }
}

/// Expand `pattern` under `workspace`; matching nothing is an error
fn expand_glob(workspace: &Path, pattern: &str) -> Result<Vec<PathBuf>, MaterializeError> {
    let invalid = |error: String| MaterializeError::InvalidGlob {
        pattern: pattern.to_string(),
        error,
    };

    let root = glob::Pattern::escape(&workspace.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut matches = Vec::new();
    for entry in glob::glob_with(&full, options).map_err(|e| invalid(e.to_string()))? {
        matches.push(entry.map_err(|e| invalid(e.to_string()))?);
    }

    if matches.is_empty() {
        return Err(MaterializeError::EmptyGlob {
            pattern: pattern.to_string(),
            workspace: workspace.to_path_buf(),
        });
    }
    Ok(matches)
}
