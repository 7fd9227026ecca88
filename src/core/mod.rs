//! Core business logic module
//!
//! Domain logic for assembling the SDK. Side effects go through the
//! adapters in [`crate::infra`] or through the [`source::SourceProvider`],
//! [`checkpoint::CheckpointStore`] and process-runner seams.
//!
//! # Submodules
//!
//! - [`catalog`] - Package catalog model and validation
//! - [`resolver`] - Dependency graph and cycle detection
//! - [`checkpoint`] - Persisted set of completed packages
//! - [`materialize`] - Copying package outputs into the SDK
//! - [`hooks`] - Build hook contract and registry
//! - [`orchestrator`] - Resumable per-package build loop
//! - [`finalize`] - Post-build SDK fixups
//! - [`config`] - `ossdk.toml` and resolved paths
//! - [`check`] - Validation without building
//! - [`clean`] - Removing build state
//! - [`doctor`] - Host tool checks

pub mod catalog;
pub mod check;
pub mod checkpoint;
pub mod clean;
pub mod config;
pub mod doctor;
pub mod finalize;
pub mod hooks;
pub mod materialize;
pub mod orchestrator;
pub mod resolver;
pub mod source;
