//! Build hook contract
//!
//! A hook is the per-package build procedure. It runs inside the package's
//! freshly reset workspace and must leave every file the package's output
//! groups reference in place. Hooks are looked up by name in a
//! [`HookRegistry`] so catalogs can stay pure data.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::catalog::Catalog;
use crate::error::{CatalogError, HookError};
use crate::infra::process::{CommandSpec, ProcessOutput, ProcessRunner};

/// Resolved location of one already-built dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// Absolute path of the dependency's source checkout
    pub path: PathBuf,
}

/// Settings a hook may need beyond its workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSettings {
    /// Target SDK version, e.g. "14.4"
    pub sdk_version: String,
    /// Installed reference SDK
    pub reference_sdk: PathBuf,
    /// CoreFoundation patch series
    pub patches_dir: PathBuf,
}

/// Everything handed to a hook for one invocation
pub struct HookContext<'a> {
    /// Package being built
    pub package: &'a str,
    /// The package's source checkout
    pub workspace: &'a Path,
    /// Declared dependencies, all already checkpointed
    pub dependencies: &'a BTreeMap<String, DependencyInfo>,
    /// Build-wide settings
    pub settings: &'a HookSettings,
    /// Process runner for external tools
    pub runner: &'a dyn ProcessRunner,
}

impl HookContext<'_> {
    /// Source path of a declared dependency
    pub fn dependency(&self, name: &str) -> Result<&Path, HookError> {
        self.dependencies
            .get(name)
            .map(|d| d.path.as_path())
            .ok_or_else(|| HookError::MissingDependency {
                dependency: name.to_string(),
            })
    }

    /// Path inside the workspace
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.workspace.join(relative)
    }

    /// Run a command; a relative or missing working directory resolves
    /// against the workspace
    pub fn run(&self, spec: CommandSpec) -> Result<ProcessOutput, HookError> {
        let cwd = match spec.cwd {
            Some(ref dir) => self.workspace.join(dir),
            None => self.workspace.to_path_buf(),
        };
        let spec = spec.current_dir(cwd);
        Ok(self.runner.run(&spec)?)
    }
}

/// A package build procedure
pub trait BuildHook {
    /// Build the package inside `ctx.workspace`
    fn run(&self, ctx: &HookContext<'_>) -> Result<(), HookError>;
}

impl<F> BuildHook for F
where
    F: Fn(&HookContext<'_>) -> Result<(), HookError>,
{
    fn run(&self, ctx: &HookContext<'_>) -> Result<(), HookError> {
        self(ctx)
    }
}

/// Named build hooks
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Box<dyn BuildHook>>,
}

impl HookRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` under `name`, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, hook: impl BuildHook + 'static) {
        self.hooks.insert(name.into(), Box::new(hook));
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, hook: impl BuildHook + 'static) -> Self {
        self.register(name, hook);
        self
    }

    /// Look up a hook
    pub fn get(&self, name: &str) -> Option<&dyn BuildHook> {
        self.hooks.get(name).map(|h| &**h)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Ensure every hook the catalog references is registered
    pub fn check_catalog(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        for pkg in catalog.ordered() {
            if let Some(ref hook) = pkg.hook {
                if !self.hooks.contains_key(hook) {
                    return Err(CatalogError::UnknownHook {
                        package: pkg.name.clone(),
                        hook: hook.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}
