//! Build checkpoint
//!
//! Records which packages have been fully built and materialized. The set
//! only grows during a run and is persisted after every package, so an
//! interrupted build resumes at the package that was in flight.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CheckpointError;

/// Ordered set of completed package names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointSet {
    names: Vec<String>,
}

impl CheckpointSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` has completed
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Record `name` as completed; returns false if it already was
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Completed names in completion order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of completed packages
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has completed yet
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CheckpointSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(&name.into());
        }
        set
    }
}

/// Persistence for the checkpoint set
pub trait CheckpointStore {
    /// Load the persisted set; absent storage is an empty set
    fn load(&self) -> Result<CheckpointSet, CheckpointError>;

    /// Replace the persisted set with `set`
    fn save(&self, set: &CheckpointSet) -> Result<(), CheckpointError>;
}

/// Checkpoint persisted as a JSON list of names
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the checkpoint file, starting a fresh logical build
    pub fn clear(&self) -> Result<bool, CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.write_err(e)),
        }
    }

    fn write_err(&self, e: impl std::fmt::Display) -> CheckpointError {
        CheckpointError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        }
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> Result<CheckpointSet, CheckpointError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CheckpointSet::new());
            }
            Err(e) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    error: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| CheckpointError::Corrupt {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    fn save(&self, set: &CheckpointSet) -> Result<(), CheckpointError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.write_err(e))?;

        let json = serde_json::to_string(set).map_err(|e| self.write_err(e))?;

        // Write beside the target and rename so readers never see a partial list
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.write_err(e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.write_err(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_err(e.error))?;

        tracing::debug!("Checkpoint saved ({} packages)", set.len());
        Ok(())
    }
}

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    saved: RefCell<CheckpointSet>,
    saves: RefCell<usize>,
}

impl MemoryCheckpointStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `set`
    pub fn with_set(set: CheckpointSet) -> Self {
        Self {
            saved: RefCell::new(set),
            saves: RefCell::new(0),
        }
    }

    /// Currently persisted set
    pub fn snapshot(&self) -> CheckpointSet {
        self.saved.borrow().clone()
    }

    /// How many times `save` was called
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<CheckpointSet, CheckpointError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, set: &CheckpointSet) -> Result<(), CheckpointError> {
        *self.saved.borrow_mut() = set.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
