//! Built-in package catalog and build hooks
//!
//! The catalog is plain TOML compiled into the binary; a project can point
//! `catalog` in `ossdk.toml` at its own file instead. Custom catalogs can
//! only reference hooks from [`builtin_registry`].

pub mod hooks;

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::catalog::Catalog;
use crate::core::config::SdkConfig;
use crate::error::CatalogError;
use crate::infra::filesystem;

pub use hooks::builtin_registry;

/// Catalog document shipped with the binary
pub const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Parse the built-in catalog
pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_toml(BUILTIN_CATALOG)
}

/// Catalog selected by `config`, with a relative path resolved against `base`
pub fn load_catalog(config: &SdkConfig, base: &Path) -> Result<Catalog> {
    match config.catalog {
        Some(ref path) => {
            let path = base.join(path);
            let content = filesystem::read_file(&path)?;
            Catalog::from_toml(&content)
                .with_context(|| format!("Invalid catalog '{}'", path.display()))
        }
        None => builtin_catalog().context("Built-in catalog is invalid"),
    }
}
