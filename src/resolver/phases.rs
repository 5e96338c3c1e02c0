//! Phase ordering pass
//!
//! Splits each topological layer by category and emits the batches phase by
//! phase: every framework sub-batch, then adapters, then integrations, then
//! features. Feature modules each get a batch of their own and never run in
//! parallel. The pass only reorders; it never changes edges, so after
//! numbering it checks that every edge still points to an earlier batch.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{ExecutionBatch, ExecutionPlan, ModuleCategory};
use crate::error::{ArchitechError, Result, graph::phase_order};

use super::graph::DependencyGraph;

/// Arrange topological layers into numbered, phase-ordered batches
pub fn arrange(graph: &DependencyGraph, layers: &[Vec<String>]) -> Result<ExecutionPlan> {
    if graph.is_empty() {
        return Ok(ExecutionPlan::default());
    }
    let has_framework = graph
        .nodes()
        .iter()
        .any(|id| graph.category(id) == Some(ModuleCategory::Framework));
    if !has_framework {
        return Err(ArchitechError::MissingFramework);
    }

    let mut groups: Vec<(Vec<String>, bool)> = Vec::new();
    for category in ModuleCategory::ALL {
        for layer in layers {
            let members: Vec<String> = layer
                .iter()
                .filter(|id| graph.category(id) == Some(category))
                .cloned()
                .collect();
            if members.is_empty() {
                continue;
            }
            if category == ModuleCategory::Feature {
                groups.extend(members.into_iter().map(|id| (vec![id], false)));
            } else {
                let parallel = members.len() > 1;
                groups.push((members, parallel));
            }
        }
    }

    let mut batch_of: HashMap<&str, usize> = HashMap::new();
    for (index, (modules, _)) in groups.iter().enumerate() {
        for id in modules {
            batch_of.insert(id.as_str(), index + 1);
        }
    }

    let mut batches = Vec::with_capacity(groups.len());
    for (index, (modules, parallel)) in groups.iter().enumerate() {
        let number = index + 1;
        let mut dependencies = BTreeSet::new();
        for id in modules {
            for upstream in graph.upstream(id) {
                let upstream_batch = batch_of.get(upstream.as_str()).copied().unwrap_or(0);
                if upstream_batch >= number {
                    return Err(phase_order(upstream.as_str(), id.as_str()));
                }
                dependencies.insert(upstream_batch);
            }
        }
        batches.push(ExecutionBatch {
            number,
            modules: modules.clone(),
            can_execute_in_parallel: *parallel,
            dependencies: dependencies.into_iter().collect(),
        });
    }

    Ok(ExecutionPlan { batches })
}
