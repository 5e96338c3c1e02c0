//! Module resolution and execution planning
//!
//! This module turns a genome into an ordered installation plan:
//!
//! 1. [`features`]: expand feature requests against the detected stack
//! 2. [`capability`]: close the module set over dependencies and capabilities,
//!    collecting every conflict
//! 3. [`graph`]: build the dependency graph and reject cycles
//! 4. [`planner`]: Kahn layering into batches, then the [`phases`] pass that
//!    enforces framework -> adapter -> integration -> feature ordering
//!
//! ## Usage
//!
//! ```rust,ignore
//! let expansion = features::expand_features(&registry, &genome, &seeds);
//! let resolution = CapabilityResolver::new(&registry).resolve(&framework, seeds);
//! resolution.ensure_no_errors()?;
//! let graph = DependencyGraph::build(&resolution)?;
//! let plan = planner::plan(&graph)?;
//! ```

pub mod capability;
pub mod features;
pub mod graph;
pub mod phases;
pub mod planner;

use std::collections::BTreeMap;

use crate::config::Genome;
use crate::domain::ModuleOrigin;

pub use capability::{CapabilityResolver, Resolution};
pub use features::FeatureExpansion;
pub use graph::DependencyGraph;

/// A module the resolver starts from, before closure over prerequisites
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub id: String,
    /// Genome parameter overrides
    pub parameters: BTreeMap<String, serde_json::Value>,
    pub origin: ModuleOrigin,
    pub confidence: u8,
    /// First entry of the module's resolution trace
    pub reason: String,
}

impl Seed {
    pub fn new(id: impl Into<String>, origin: ModuleOrigin, confidence: u8, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parameters: BTreeMap::new(),
            origin,
            confidence,
            reason: reason.into(),
        }
    }
}

/// Seeds for every module listed in the genome, in genome order
pub fn genome_seeds(genome: &Genome) -> Vec<Seed> {
    genome
        .modules
        .iter()
        .map(|entry| Seed {
            parameters: entry.parameters.clone(),
            ..Seed::new(&entry.id, ModuleOrigin::Explicit, 100, "listed in genome")
        })
        .collect()
}
