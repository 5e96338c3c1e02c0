//! Resolved module types

use std::collections::BTreeMap;

use serde::Serialize;

use super::module::{Module, ModuleCategory};

/// How a module entered the resolved set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleOrigin {
    /// Listed in the genome
    Explicit,
    /// Added by the orchestrator for the project framework
    Framework,
    /// Expanded from a feature request
    Feature,
    /// Pulled in as an explicit dependency of another module
    Dependency,
    /// Pulled in as the unique provider of a required capability
    Capability,
}

/// A module selected for installation, with the trace of how it got there
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedModule {
    pub module: Module,
    /// Module defaults overridden by the genome entry
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Ordered trace of resolution decisions
    pub resolution_path: Vec<String>,
    /// Heuristic quality of the match, 0-100
    pub confidence: u8,
    /// Capability -> ids of the providers bound to it
    pub capabilities: BTreeMap<String, Vec<String>>,
    pub origin: ModuleOrigin,
}

impl ResolvedModule {
    pub fn new(module: Module, origin: ModuleOrigin, confidence: u8) -> Self {
        let parameters = module.parameters.clone();
        Self {
            module,
            parameters,
            resolution_path: Vec::new(),
            confidence: confidence.min(100),
            capabilities: BTreeMap::new(),
            origin,
        }
    }

    pub fn id(&self) -> &str {
        &self.module.id
    }

    pub fn category(&self) -> ModuleCategory {
        self.module.category
    }

    /// Append a step to the resolution trace
    pub fn trace(&mut self, step: impl Into<String>) {
        self.resolution_path.push(step.into());
    }

    /// Apply genome parameter overrides on top of the module defaults
    pub fn override_parameters(&mut self, overrides: &BTreeMap<String, serde_json::Value>) {
        for (key, value) in overrides {
            self.parameters.insert(key.clone(), value.clone());
        }
    }

    /// Every module id this module must run after: explicit dependencies
    /// that are modules plus the providers bound to its capabilities
    pub fn upstream_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for dep in &self.module.dependencies {
            if !ids.contains(dep) {
                ids.push(dep.clone());
            }
        }
        for providers in self.capabilities.values() {
            for provider in providers {
                if provider != &self.module.id && !ids.contains(provider) {
                    ids.push(provider.clone());
                }
            }
        }
        ids
    }
}
