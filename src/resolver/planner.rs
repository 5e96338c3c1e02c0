//! Execution planning
//!
//! Kahn's algorithm with seed-order tie-breaking groups the graph into layers:
//! layer k holds every module whose upstream modules all sit in layers < k.
//! Within a layer, modules keep the resolver's insertion order, so the same
//! genome always yields the same plan.
//!
//! The layers are then handed to [`super::phases`], which reorders them into
//! category phases and numbers the batches.

use std::collections::HashMap;

use crate::domain::ExecutionPlan;
use crate::error::Result;

use super::graph::DependencyGraph;
use super::phases;

/// Plan batches for a validated graph
pub fn plan(graph: &DependencyGraph) -> Result<ExecutionPlan> {
    let layers = layers(graph);
    let plan = phases::arrange(graph, &layers)?;
    tracing::debug!(
        layers = layers.len(),
        batches = plan.batches.len(),
        modules = plan.total_modules(),
        "execution plan built"
    );
    Ok(plan)
}

/// Topological layers, each ordered by the graph's node order
///
/// The graph is acyclic by construction, so every node lands in a layer.
pub fn layers(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for node in graph.nodes() {
        in_degree.insert(node.as_str(), graph.upstream(node).len());
        for dep in graph.upstream(node) {
            dependents.entry(dep.as_str()).or_default().push(node.as_str());
        }
    }

    let mut layers: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<&str> = graph
        .nodes()
        .iter()
        .map(String::as_str)
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();

    while !current.is_empty() {
        let mut next: Vec<&str> = Vec::new();
        for &node in &current {
            for &dependent in dependents.get(node).map_or(&[][..], Vec::as_slice) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(dependent);
                    }
                }
            }
        }
        // Seed-order tie-break
        next.sort_by_key(|n| graph.nodes().iter().position(|x| x.as_str() == *n));
        layers.push(current.iter().map(|s| s.to_string()).collect());
        current = next;
    }

    layers
}
