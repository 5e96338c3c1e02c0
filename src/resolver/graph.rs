//! Dependency graph over resolved modules
//!
//! ## Graph Structure
//!
//! Each module maps to the modules it must run after:
//!
//! ```text
//! BTreeMap<String, Vec<String>>
//!    ↓              ↓
//!  module_id     [upstream1, upstream2]
//! ```
//!
//! Upstream ids come from the module's dependency ids and from the providers
//! bound to its capabilities. Dependency entries that name a capability rather
//! than a module are not edges themselves; the bound provider is.
//!
//! Cycles are detected with a three-color DFS (white = unvisited, gray = on
//! the current path, black = done) and reported with the full chain.

use std::collections::{BTreeMap, HashMap};

use crate::domain::ModuleCategory;
use crate::error::{Result, graph::circular};

use super::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Gray,
    Black,
}

/// Directed acyclic graph of module ids
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Node ids in resolution order
    nodes: Vec<String>,
    upstream: BTreeMap<String, Vec<String>>,
    categories: HashMap<String, ModuleCategory>,
}

impl DependencyGraph {
    /// Build the graph and reject cycles
    pub fn build(resolution: &Resolution) -> Result<Self> {
        let nodes: Vec<String> = resolution
            .modules
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        let categories = resolution
            .modules
            .iter()
            .map(|m| (m.id().to_string(), m.category()))
            .collect();

        let mut upstream = BTreeMap::new();
        for module in &resolution.modules {
            let edges: Vec<String> = module
                .upstream_ids()
                .into_iter()
                .filter(|id| nodes.contains(id))
                .collect();
            upstream.insert(module.id().to_string(), edges);
        }

        let graph = Self {
            nodes,
            upstream,
            categories,
        };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Node ids in resolution order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Modules `id` must run after
    pub fn upstream(&self, id: &str) -> &[String] {
        self.upstream.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn category(&self, id: &str) -> Option<ModuleCategory> {
        self.categories.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if !marks.contains_key(node.as_str()) {
                self.visit(node, &mut marks, &mut path)?;
            }
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Result<()> {
        match marks.get(node) {
            Some(Mark::Black) => return Ok(()),
            Some(Mark::Gray) => {
                let start = path.iter().position(|n| *n == node).unwrap_or(0);
                let chain: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                return Err(circular(&chain));
            }
            None => {}
        }

        marks.insert(node, Mark::Gray);
        path.push(node);
        for dep in self.upstream(node) {
            self.visit(dep, marks, path)?;
        }
        path.pop();
        marks.insert(node, Mark::Black);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Module, ModuleOrigin, ResolvedModule};
    use crate::error::ArchitechError;

    fn resolution(modules: &[(&str, ModuleCategory, &[&str])]) -> Resolution {
        Resolution {
            modules: modules
                .iter()
                .map(|(id, category, deps)| {
                    let mut module = Module::new(*id, *category, "1.0.0");
                    module.dependencies = deps.iter().map(|d| d.to_string()).collect();
                    ResolvedModule::new(module, ModuleOrigin::Explicit, 100)
                })
                .collect(),
            conflicts: Vec::new(),
        }
    }

    #[test]
    fn test_build_graph() {
        let resolution = resolution(&[
            ("framework/nextjs", ModuleCategory::Framework, &[]),
            ("adapter/drizzle", ModuleCategory::Adapter, &["framework/nextjs"]),
        ]);
        let graph = DependencyGraph::build(&resolution).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.upstream("adapter/drizzle"), ["framework/nextjs"]);
        assert!(graph.upstream("framework/nextjs").is_empty());
        assert_eq!(graph.category("adapter/drizzle"), Some(ModuleCategory::Adapter));
    }

    #[test]
    fn test_capability_bindings_become_edges() {
        let mut resolution = resolution(&[
            ("integration/clerk", ModuleCategory::Integration, &[]),
            ("feature/auth", ModuleCategory::Feature, &["auth-provider"]),
        ]);
        resolution.modules[1]
            .capabilities
            .insert("auth-provider".to_string(), vec!["integration/clerk".to_string()]);

        let graph = DependencyGraph::build(&resolution).unwrap();
        assert_eq!(graph.upstream("feature/auth"), ["integration/clerk"]);
    }

    #[test]
    fn test_cycle_reports_chain() {
        let resolution = resolution(&[
            ("adapter/a", ModuleCategory::Adapter, &["adapter/b"]),
            ("adapter/b", ModuleCategory::Adapter, &["adapter/c"]),
            ("adapter/c", ModuleCategory::Adapter, &["adapter/a"]),
        ]);
        match DependencyGraph::build(&resolution).unwrap_err() {
            ArchitechError::CircularDependency { chain } => {
                assert_eq!(chain, "adapter/a -> adapter/b -> adapter/c -> adapter/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_through_capability_is_ignored() {
        let mut resolution = resolution(&[("adapter/a", ModuleCategory::Adapter, &[])]);
        resolution.modules[0]
            .capabilities
            .insert("x".to_string(), vec!["adapter/a".to_string()]);
        assert!(DependencyGraph::build(&resolution).is_ok());
    }
}
