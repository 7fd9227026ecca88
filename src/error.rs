//! Error types for ossdk
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Catalog configuration errors
///
/// These are authoring bugs in the package table and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Package name not present in the catalog
    #[error("Unknown package '{name}'")]
    UnknownPackage { name: String },

    /// Two packages share a name
    #[error("Package '{name}' is declared more than once")]
    DuplicatePackage { name: String },

    /// Dependency refers to a package that is not in the catalog
    #[error("Package '{package}' depends on unknown package '{dependency}'")]
    UnknownDependency { package: String, dependency: String },

    /// Dependency is declared after the package that needs it
    #[error(
        "Package '{package}' depends on '{dependency}', which is declared after it; \
         a package can only depend on packages that come before it"
    )]
    DependencyOutOfOrder { package: String, dependency: String },

    /// Dependency cycle
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// Output group or symlink spec is malformed
    #[error("Package '{package}' has an invalid output spec: {message}")]
    InvalidOutput { package: String, message: String },

    /// Hook name not registered
    #[error("Package '{package}' references unknown build hook '{hook}'")]
    UnknownHook { package: String, hook: String },

    /// Catalog document could not be parsed
    #[error("Failed to parse catalog: {0}")]
    Parse(String),
}

/// Checkpoint persistence errors
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Failed to read the checkpoint file
    #[error("Failed to read checkpoint '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Checkpoint content is not a list of package names
    #[error("Checkpoint '{path}' is corrupt: {error}")]
    Corrupt { path: PathBuf, error: String },

    /// Failed to write the checkpoint file
    #[error("Failed to write checkpoint '{path}': {error}")]
    Write { path: PathBuf, error: String },
}

/// Output materialization errors
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// Explicit file entry missing from the workspace
    #[error("Declared output file '{path}' does not exist")]
    MissingFile { path: PathBuf },

    /// Whole-directory entry missing from the workspace
    #[error("Declared output directory '{path}' does not exist")]
    MissingDirectory { path: PathBuf },

    /// Glob pattern matched nothing
    #[error("Output glob '{pattern}' matched nothing in '{workspace}'")]
    EmptyGlob { pattern: String, workspace: PathBuf },

    /// Glob pattern could not be compiled or walked
    #[error("Invalid output glob '{pattern}': {error}")]
    InvalidGlob { pattern: String, error: String },

    /// Symlink destination already exists
    #[error("Symlink '{path}' already exists")]
    SymlinkExists { path: PathBuf },

    /// Copy or link failed
    #[error("Failed to materialize '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Process could not be started
    #[error("Failed to spawn '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Process exited unsuccessfully
    #[error("Failed to run '{command}'. Exit code {code}\n{output}")]
    NonZeroExit {
        command: String,
        code: i32,
        output: String,
    },

    /// Captured output could not be collected
    #[error("Failed to capture output of '{command}': {error}")]
    Capture { command: String, error: String },
}

/// Build hook errors
#[derive(Error, Debug)]
pub enum HookError {
    /// An external process failed
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A filesystem step failed
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Declared dependency was not handed to the hook
    #[error("Build hook expected dependency '{dependency}'")]
    MissingDependency { dependency: String },

    /// Any other hook-level failure
    #[error("{0}")]
    Failed(String),
}

/// Source acquisition errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Cloning failed
    #[error("Failed to clone '{url}': {error}")]
    CloneFailed { url: String, error: String },

    /// Source directory for a package does not exist
    #[error("Source directory '{path}' for package '{package}' does not exist")]
    MissingSource { package: String, path: PathBuf },

    /// git step failed
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Filesystem step failed
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// Checksum verification failed
    #[error("Checksum verification failed for '{file}': expected {expected}, got {actual}")]
    ChecksumFailed {
        file: String,
        expected: String,
        actual: String,
    },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Max retries exceeded
    #[error("Download failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove a file or directory
    #[error("Failed to remove '{path}': {error}")]
    Remove { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to create a symlink
    #[error("Failed to create symlink '{path}' -> '{target}': {error}")]
    Symlink {
        path: PathBuf,
        target: PathBuf,
        error: String,
    },
}

/// Finalization errors
#[derive(Error, Debug)]
pub enum FinalizeError {
    /// Compatibility header could not be fetched
    #[error("Failed to fetch compatibility header: {0}")]
    Download(#[from] DownloadError),

    /// Reference SDK is not installed
    #[error("Reference SDK library directory not found at '{path}'")]
    ReferenceSdkMissing { path: PathBuf },

    /// Filesystem step failed
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

/// Errors that abort an orchestrator run
///
/// Every variant is fatal. Completed packages stay checkpointed, so the run
/// can be resumed after the underlying condition is fixed.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Catalog problem detected before or during the run
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Dependency was not built before the package that needs it
    #[error(
        "Dependencies for '{package}' not satisfied ({}); \
         a package can only depend on packages that come before it",
        missing.join(", ")
    )]
    DependenciesNotBuilt {
        package: String,
        missing: Vec<String>,
    },

    /// Source preparation failed
    #[error("Failed to prepare sources for '{package}': {source}")]
    Source {
        package: String,
        #[source]
        source: SourceError,
    },

    /// Build hook failed
    #[error("Build hook for '{package}' failed: {source}")]
    Hook {
        package: String,
        #[source]
        source: HookError,
    },

    /// Output materialization failed
    #[error("Failed to materialize outputs for '{package}': {source}")]
    Materialize {
        package: String,
        #[source]
        source: MaterializeError,
    },

    /// Checkpoint load or save failed
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// Top-level ossdk error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Orchestrator error
    #[error("Build error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    /// Finalization error
    #[error("Finalize error: {0}")]
    Finalize(#[from] FinalizeError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}
