//! Source acquisition contract
//!
//! The orchestrator never touches git directly. It asks a [`SourceProvider`]
//! for a pristine checkout of each package and for the checkout paths of
//! already-built dependencies.

use std::path::PathBuf;

use crate::core::catalog::Package;
use crate::error::SourceError;

/// Supplies package source trees
pub trait SourceProvider {
    /// Make the package's checkout present and pristine, returning its path
    ///
    /// Pristine means local modifications are discarded and untracked files
    /// removed, so a build hook can be retried from scratch.
    fn prepare(&self, package: &Package) -> Result<PathBuf, SourceError>;

    /// Path of the package's checkout, without side effects
    fn source_path(&self, package: &Package) -> PathBuf;
}
