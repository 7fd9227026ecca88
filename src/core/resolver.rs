//! Dependency resolution
//!
//! Computes a dependency-first order over the catalog and detects cycles.
//! The catalog's declaration order is the build schedule; this graph is only
//! used to validate it.

use std::collections::{HashMap, HashSet};

use crate::error::CatalogError;

/// Dependency graph for packages
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Adjacency list: package -> dependencies
    edges: HashMap<String, Vec<String>>,
    /// All known packages, in insertion order
    nodes: Vec<String>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package to the graph
    pub fn add_package(&mut self, name: &str, dependencies: Vec<String>) {
        for node in std::iter::once(name).chain(dependencies.iter().map(String::as_str)) {
            if !self.nodes.iter().any(|n| n == node) {
                self.nodes.push(node.to_string());
            }
        }
        self.edges.insert(name.to_string(), dependencies);
    }

    /// Compute topological sort (build order)
    ///
    /// Returns packages in order such that dependencies come before
    /// dependents. Ties keep insertion order.
    pub fn topological_sort(&self) -> Result<Vec<String>, CatalogError> {
        let mut visited = HashSet::new();
        let mut temp_visited = HashSet::new();
        let mut result = Vec::new();
        let mut cycle_path = Vec::new();

        for node in &self.nodes {
            if !visited.contains(node) {
                self.visit(
                    node,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                    &mut cycle_path,
                )?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        temp_visited: &mut HashSet<String>,
        result: &mut Vec<String>,
        cycle_path: &mut Vec<String>,
    ) -> Result<(), CatalogError> {
        if temp_visited.contains(node) {
            cycle_path.push(node.to_string());
            return Err(CatalogError::CircularDependency {
                cycle: cycle_path.clone(),
            });
        }

        if visited.contains(node) {
            return Ok(());
        }

        temp_visited.insert(node.to_string());
        cycle_path.push(node.to_string());

        if let Some(deps) = self.edges.get(node) {
            for dep in deps {
                self.visit(dep, visited, temp_visited, result, cycle_path)?;
            }
        }

        cycle_path.pop();
        temp_visited.remove(node);
        visited.insert(node.to_string());
        result.push(node.to_string());

        Ok(())
    }
}
