//! Package catalog
//!
//! The catalog is an ordered table of package definitions. Declaration order
//! is the build schedule: a package may only depend on packages declared
//! before it. The whole table is validated once when it is loaded, so
//! authoring mistakes surface before anything is cloned or built.
//!
//! Catalog documents are TOML:
//!
//! ```toml
//! [[package]]
//! name = "libedit"
//!
//! [[package.output]]
//! sdk_dir = "usr/include/editline"
//! files = ["src/editline/readline.h"]
//!
//! [[package.symlink]]
//! dir = "usr/include/readline"
//! link = "readline.h"
//! target = "../editline/readline.h"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path};

use crate::core::resolver::DependencyGraph;
use crate::error::CatalogError;

/// One subset of a package's build output to relocate into the SDK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputGroup {
    /// Destination relative to the SDK root; empty means the root itself
    #[serde(default)]
    pub sdk_dir: String,

    /// Workspace-relative files, each landing at `sdk_dir/<basename>`
    #[serde(default)]
    pub files: Vec<String>,

    /// Workspace-relative glob patterns, relocated relative to their anchor
    #[serde(default)]
    pub globs: Vec<String>,

    /// Workspace-relative directory copied whole to `sdk_dir/<basename>`
    #[serde(default)]
    pub directory: Option<String>,
}

impl OutputGroup {
    /// Create an empty group targeting `sdk_dir`
    pub fn new(sdk_dir: impl Into<String>) -> Self {
        Self {
            sdk_dir: sdk_dir.into(),
            ..Self::default()
        }
    }

    /// Add explicit files
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Add glob patterns
    #[must_use]
    pub fn globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globs.extend(globs.into_iter().map(Into::into));
        self
    }

    /// Copy a whole directory
    #[must_use]
    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.files.is_empty() && self.globs.is_empty() && self.directory.is_none()
    }
}

/// A symbolic link created in the SDK after a package's outputs are in place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Symlink {
    /// Directory holding the link, relative to the SDK root
    pub dir: String,
    /// Link file name
    pub link: String,
    /// Textual link target, relative to `dir`
    pub target: String,
}

impl Symlink {
    /// Create a symlink spec
    pub fn new(dir: impl Into<String>, link: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            link: link.into(),
            target: target.into(),
        }
    }
}

/// A package definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Package {
    /// Unique name; also the monorepo subdirectory
    pub name: String,

    /// Packages whose checkouts the build hook needs
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Registered build hook name
    #[serde(default)]
    pub hook: Option<String>,

    /// Output groups
    #[serde(default, rename = "output")]
    pub outputs: Vec<OutputGroup>,

    /// Symlinks created after the outputs
    #[serde(default, rename = "symlink")]
    pub symlinks: Vec<Symlink>,

    /// Standalone repository replacing the monorepo subdirectory
    #[serde(default)]
    pub alternate_repo: Option<String>,
}

impl Package {
    /// Create a package with no hook, outputs or dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            hook: None,
            outputs: Vec::new(),
            symlinks: Vec::new(),
            alternate_repo: None,
        }
    }

    /// Set dependencies
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the build hook
    #[must_use]
    pub fn with_hook(mut self, hook: impl Into<String>) -> Self {
        self.hook = Some(hook.into());
        self
    }

    /// Add an output group
    #[must_use]
    pub fn with_output(mut self, group: OutputGroup) -> Self {
        self.outputs.push(group);
        self
    }

    /// Add a symlink
    #[must_use]
    pub fn with_symlink(mut self, symlink: Symlink) -> Self {
        self.symlinks.push(symlink);
        self
    }

    /// Use a standalone repository
    #[must_use]
    pub fn with_alternate_repo(mut self, url: impl Into<String>) -> Self {
        self.alternate_repo = Some(url.into());
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default, rename = "package")]
    packages: Vec<Package>,
}

/// Validated, immutable package table
#[derive(Debug, Clone)]
pub struct Catalog {
    packages: Vec<Package>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, validating names, dependency order and output specs
    pub fn new(packages: Vec<Package>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(packages.len());
        for (pos, pkg) in packages.iter().enumerate() {
            if pkg.name.trim().is_empty() {
                return Err(CatalogError::Parse(format!(
                    "package #{} has an empty name",
                    pos + 1
                )));
            }
            if index.insert(pkg.name.clone(), pos).is_some() {
                return Err(CatalogError::DuplicatePackage {
                    name: pkg.name.clone(),
                });
            }
        }

        let catalog = Self { packages, index };
        catalog.validate_dependencies()?;
        for pkg in &catalog.packages {
            validate_outputs(pkg)?;
        }
        Ok(catalog)
    }

    /// Parse and validate a TOML catalog document
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument =
            toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(doc.packages)
    }

    /// Look up a package by name
    pub fn lookup(&self, name: &str) -> Result<&Package, CatalogError> {
        self.index
            .get(name)
            .map(|&pos| &self.packages[pos])
            .ok_or_else(|| CatalogError::UnknownPackage {
                name: name.to_string(),
            })
    }

    /// Packages in declaration order
    pub fn ordered(&self) -> &[Package] {
        &self.packages
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Whether a package is declared
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn validate_dependencies(&self) -> Result<(), CatalogError> {
        let mut graph = DependencyGraph::new();

        for pkg in &self.packages {
            for dep in &pkg.dependencies {
                if !self.contains(dep) {
                    return Err(CatalogError::UnknownDependency {
                        package: pkg.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
            graph.add_package(&pkg.name, pkg.dependencies.clone());
        }

        graph.topological_sort()?;

        for (pos, pkg) in self.packages.iter().enumerate() {
            for dep in &pkg.dependencies {
                if self.index[dep] >= pos {
                    return Err(CatalogError::DependencyOutOfOrder {
                        package: pkg.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn validate_outputs(pkg: &Package) -> Result<(), CatalogError> {
    let invalid = |message: String| CatalogError::InvalidOutput {
        package: pkg.name.clone(),
        message,
    };

    for group in &pkg.outputs {
        if group.is_empty() {
            return Err(invalid(format!(
                "output group for '{}' selects nothing",
                group.sdk_dir
            )));
        }
        check_relative(&group.sdk_dir, true).map_err(&invalid)?;
        for path in group
            .files
            .iter()
            .chain(&group.globs)
            .chain(group.directory.iter())
        {
            check_relative(path, false).map_err(&invalid)?;
        }
    }

    for link in &pkg.symlinks {
        check_relative(&link.dir, true).map_err(&invalid)?;
        if link.link.is_empty() || link.link.contains('/') {
            return Err(invalid(format!("invalid symlink name '{}'", link.link)));
        }
        if link.target.is_empty() {
            return Err(invalid(format!("symlink '{}' has no target", link.link)));
        }
    }
    Ok(())
}

/// Paths in output specs must stay inside their root
fn check_relative(path: &str, allow_empty: bool) -> Result<(), String> {
    if path.is_empty() {
        return if allow_empty {
            Ok(())
        } else {
            Err("empty path".to_string())
        };
    }
    let escapes = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(format!("path '{path}' must be relative and stay inside its root"));
    }
    Ok(())
}
