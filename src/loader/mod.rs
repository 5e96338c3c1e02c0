//! Blueprint loading
//!
//! [`ModuleLoader`] fetches a module's blueprint through a [`BlueprintSource`],
//! validates it, and keeps the raw text in the [`CacheStore`] so later runs skip
//! the fetch. Only blueprints that parse and validate are cached.

use std::fs;

use crate::cache::CacheStore;
use crate::domain::{Blueprint, Module};
use crate::error::{Result, module::load_failed};
use crate::registry::BLUEPRINT_FILE;

/// Where blueprint text comes from
pub trait BlueprintSource: Send + Sync {
    fn fetch(&self, module: &Module) -> Result<String>;
}

/// Reads `blueprint.yaml` from the directory the module was discovered in
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBlueprintSource;

impl BlueprintSource for FsBlueprintSource {
    fn fetch(&self, module: &Module) -> Result<String> {
        let dir = module
            .source_dir
            .as_ref()
            .ok_or_else(|| load_failed(&module.id, "module has no source directory"))?;
        let path = dir.join(BLUEPRINT_FILE);
        fs::read_to_string(&path)
            .map_err(|e| load_failed(&module.id, format!("{}: {}", path.display(), e)))
    }
}

/// Cache-fronted blueprint loader
pub struct ModuleLoader {
    source: Box<dyn BlueprintSource>,
    cache: Option<CacheStore>,
}

impl ModuleLoader {
    pub fn new(source: Box<dyn BlueprintSource>, cache: Option<CacheStore>) -> Self {
        Self { source, cache }
    }

    /// Loader reading from disk, without a cache
    #[cfg(test)]
    pub fn uncached() -> Self {
        Self::new(Box::new(FsBlueprintSource), None)
    }

    /// Load and validate a module's blueprint
    ///
    /// Cache failures degrade to a fetch; they never fail the load.
    pub fn load(&self, module: &Module) -> Result<Blueprint> {
        if let Some(cache) = &self.cache {
            match cache.get(&module.id, &module.version) {
                Ok(Some(text)) => match Blueprint::from_yaml(&text) {
                    Ok(blueprint) => return Ok(blueprint),
                    Err(reason) => {
                        tracing::warn!(module = %module.id, %reason, "cached blueprint is invalid, refetching");
                    }
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(module = %module.id, error = %e, "cache read failed"),
            }
        }

        let text = self.source.fetch(module)?;
        let blueprint = Blueprint::from_yaml(&text).map_err(|reason| load_failed(&module.id, reason))?;
        tracing::debug!(module = %module.id, actions = blueprint.actions.len(), "blueprint loaded");

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&module.id, &module.version, &text) {
                tracing::warn!(module = %module.id, error = %e, "cache write failed");
            }
        }
        Ok(blueprint)
    }
}

/// In-memory source keyed by module id
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryBlueprintSource {
    blueprints: std::collections::HashMap<String, String>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryBlueprintSource {
    pub fn with(mut self, module_id: &str, yaml: &str) -> Self {
        self.blueprints.insert(module_id.to_string(), yaml.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl BlueprintSource for MemoryBlueprintSource {
    fn fetch(&self, module: &Module) -> Result<String> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.blueprints
            .get(&module.id)
            .cloned()
            .ok_or_else(|| load_failed(&module.id, "no blueprint registered"))
    }
}

#[cfg(test)]
impl BlueprintSource for std::sync::Arc<MemoryBlueprintSource> {
    fn fetch(&self, module: &Module) -> Result<String> {
        self.as_ref().fetch(module)
    }
}
