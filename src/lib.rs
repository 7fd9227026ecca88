//! ossdk - assemble a macOS platform SDK from open-source components
//!
//! Builds a header-and-stub SDK by running per-package build procedures
//! over Apple's open-source releases, copying their outputs into an SDK
//! tree and finishing it with stubs from an installed reference SDK.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Catalog, orchestrator, materializer and finalizer
//! - [`packages`] - Built-in catalog and build hooks
//! - [`infra`] - Infrastructure layer (network, filesystem, processes, git)
//! - [`config`] - Defaults and URLs
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod packages;
