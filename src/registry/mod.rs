//! Module registry and capability index
//!
//! This module provides:
//! - Module registration and lookup by id
//! - The capability index (capability -> providing module ids)
//! - The feature index used by feature expansion
//! - Discovery of `module.yaml` manifests on disk
//! - "Did you mean" suggestions for unknown ids

mod discovery;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::domain::{Module, ModuleCategory};
use crate::error::{Result, module::duplicate as duplicate_module};

pub use discovery::{BLUEPRINT_FILE, MANIFEST_FILE};

/// Registry of every module known to the engine
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    by_id: HashMap<String, usize>,
    capability_index: BTreeMap<String, Vec<String>>,
    feature_index: BTreeMap<String, Vec<String>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-parsed modules
    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
        let mut registry = Self::new();
        for module in modules {
            registry.register(module)?;
        }
        Ok(registry)
    }

    /// Discover and register every module under `root`
    pub fn load_dir(root: &Path) -> Result<Self> {
        Self::from_modules(discovery::discover_modules(root)?)
    }

    /// Register a module, indexing its capabilities and feature
    pub fn register(&mut self, module: Module) -> Result<()> {
        module.validate()?;
        if self.by_id.contains_key(&module.id) {
            return Err(duplicate_module(&module.id));
        }

        for capability in &module.provides {
            let providers = self.capability_index.entry(capability.clone()).or_default();
            providers.push(module.id.clone());
            providers.sort();
        }
        if let Some(feature) = &module.feature {
            let candidates = self.feature_index.entry(feature.clone()).or_default();
            candidates.push(module.id.clone());
            candidates.sort();
        }

        self.by_id.insert(module.id.clone(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Module> {
        self.by_id.get(id).and_then(|&idx| self.modules.get(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All modules sorted by id
    pub fn modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.iter().collect();
        modules.sort_by(|a, b| a.id.cmp(&b.id));
        modules
    }

    /// Modules of one category sorted by id
    pub fn by_category(&self, category: ModuleCategory) -> Vec<&Module> {
        self.modules()
            .into_iter()
            .filter(|m| m.category == category)
            .collect()
    }

    /// Ids of the modules providing a capability, sorted
    pub fn providers(&self, capability: &str) -> &[String] {
        self.capability_index
            .get(capability)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether any registered module provides `name` as a capability
    pub fn is_capability(&self, name: &str) -> bool {
        self.capability_index.contains_key(name)
    }

    /// Modules that realise a feature, sorted by id
    pub fn feature_candidates(&self, feature: &str) -> Vec<&Module> {
        self.feature_index
            .get(feature)
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every feature name known to the registry
    pub fn features(&self) -> Vec<&str> {
        self.feature_index.keys().map(String::as_str).collect()
    }

    /// Registered ids that look like `id`, best match first
    ///
    /// Matches on the last id segment, on prefixes, and on small edit distances.
    pub fn similar_ids(&self, id: &str) -> Vec<String> {
        let wanted_name = id.rsplit('/').next().unwrap_or(id);
        let mut scored: Vec<(usize, &str)> = self
            .modules
            .iter()
            .filter_map(|m| {
                let distance = edit_distance(&m.id, id);
                let same_name = m.name() == wanted_name;
                let prefix = m.id.starts_with(id) || id.starts_with(&m.id);
                if same_name || prefix || distance <= 2 {
                    Some((if same_name { 0 } else { distance }, m.id.as_str()))
                } else {
                    None
                }
            })
            .collect();
        scored.sort();
        scored.into_iter().take(3).map(|(_, id)| id.to_string()).collect()
    }
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}
