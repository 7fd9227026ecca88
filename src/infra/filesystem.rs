//! Filesystem operations
//!
//! Handles file and directory operations. Copies never dereference symbolic
//! links: a link in the source becomes a link with the same textual target.

use std::fs;
use std::os::unix::fs as unix_fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| FilesystemError::Remove {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Remove a single file or symlink
pub fn remove_file(path: &Path) -> Result<(), FilesystemError> {
    fs::remove_file(path).map_err(|e| FilesystemError::Remove {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Whether anything (including a dangling symlink) exists at `path`
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Create a symbolic link at `link` pointing at `target`
///
/// The target is stored verbatim and is not checked for existence.
pub fn symlink(target: &Path, link: &Path) -> Result<(), FilesystemError> {
    unix_fs::symlink(target, link).map_err(|e| FilesystemError::Symlink {
        path: link.to_path_buf(),
        target: target.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy one file, recreating symlinks instead of following them
///
/// An existing destination is replaced.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    let copy_err = |e: std::io::Error| FilesystemError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    };

    let meta = from.symlink_metadata().map_err(copy_err)?;
    if meta.file_type().is_symlink() {
        let target = fs::read_link(from).map_err(copy_err)?;
        if entry_exists(to) {
            remove_file(to)?;
        }
        return symlink(&target, to);
    }

    // fs::copy would write through a symlink sitting at the destination
    if to.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
        remove_file(to)?;
    }
    fs::copy(from, to).map_err(copy_err)?;
    Ok(())
}

/// Copy the contents behind `from`, following symlinks
pub fn copy_resolved(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if to.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
        remove_file(to)?;
    }
    fs::copy(from, to).map_err(|e| FilesystemError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(())
}

/// Entries of `dir`, sorted by file name
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
    let read_err = |e: std::io::Error| FilesystemError::ReadFile {
        path: dir.to_path_buf(),
        error: e.to_string(),
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    entries.sort();
    Ok(entries)
}

/// Recursively merge `src` into `dst`
///
/// Directories are created as needed, files overwrite existing ones and
/// symlinks are recreated verbatim. Entries rejected by `keep` are skipped;
/// a rejected directory is not descended into. Returns the number of
/// non-directory entries copied.
pub fn copy_tree<F>(src: &Path, dst: &Path, keep: F) -> Result<usize, FilesystemError>
where
    F: Fn(&DirEntry) -> bool,
{
    create_dir_all(dst)?;
    let mut copied = 0;

    let walker = WalkDir::new(src)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep(entry));

    for entry in walker {
        let entry = entry.map_err(|e| FilesystemError::ReadFile {
            path: e.path().map_or_else(|| src.to_path_buf(), Path::to_path_buf),
            error: e.to_string(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let dest = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&dest)?;
        } else {
            copy_file(entry.path(), &dest)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Replace every occurrence of `find` with `replace`, line by line
///
/// The file is only rewritten when at least one line changed. Returns
/// whether anything was replaced.
pub fn replace_in_file(path: &Path, find: &str, replace: &str) -> Result<bool, FilesystemError> {
    let contents = read_file(path)?;
    let mut modified = false;
    let mut rewritten = String::with_capacity(contents.len());

    for line in contents.split_inclusive('\n') {
        if line.contains(find) {
            rewritten.push_str(&line.replace(find, replace));
            modified = true;
        } else {
            rewritten.push_str(line);
        }
    }

    if modified {
        fs::write(path, rewritten).map_err(|e| FilesystemError::WriteFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(modified)
}

/// Delete every symlink under `dir` whose target does not exist
///
/// Returns the removed link paths.
pub fn remove_dangling_symlinks(dir: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
    let dangling: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path_is_symlink() && !entry.path().exists())
        .map(DirEntry::into_path)
        .collect();

    for link in &dangling {
        remove_file(link)?;
    }
    Ok(dangling)
}
