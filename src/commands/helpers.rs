//! Command helper utilities

use std::path::{Path, PathBuf};

use crate::cache::CacheStore;
use crate::cli::RegistryArgs;
use crate::config::{EngineConfig, Genome};
use crate::error::{ArchitechError, Result};
use crate::registry::ModuleRegistry;

/// Resolve the current directory
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| ArchitechError::IoError {
        message: format!("Failed to get current directory: {e}"),
    })
}

/// Load the engine configuration and apply command line overrides
pub fn load_config(path: Option<&Path>, registry: &RegistryArgs) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(path)?;
    if let Some(dir) = &registry.modules_dir {
        config.modules_dir = Some(dir.clone());
    }
    tracing::debug!(?config, "engine configuration loaded");
    Ok(config)
}

/// Discover every module under the configured registry directory
pub fn load_registry(config: &EngineConfig) -> Result<ModuleRegistry> {
    let dir = config.modules_dir();
    let registry = ModuleRegistry::load_dir(&dir)?;
    tracing::info!(modules = registry.len(), dir = %dir.display(), "module registry loaded");
    Ok(registry)
}

/// Blueprint cache at the configured location
pub fn cache_store(config: &EngineConfig) -> Result<CacheStore> {
    Ok(CacheStore::new(config.cache_dir()?, config.cache_limits()))
}

/// Load a genome file
pub fn load_genome(path: &Path) -> Result<Genome> {
    let genome = Genome::load(path)?;
    tracing::debug!(project = %genome.project.name, path = %path.display(), "genome loaded");
    Ok(genome)
}

/// Whether `path` is a directory with at least one entry
pub fn is_non_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_applies_modules_dir_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "modules_dir: /from/file\n").unwrap();
        let args = RegistryArgs {
            modules_dir: Some(PathBuf::from("/from/flag")),
        };
        let config = load_config(Some(&path), &args).unwrap();
        assert_eq!(config.modules_dir(), PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_load_registry_missing_dir() {
        let temp = TempDir::new().unwrap();
        let config = EngineConfig {
            modules_dir: Some(temp.path().join("missing")),
            ..EngineConfig::default()
        };
        assert!(matches!(
            load_registry(&config),
            Err(ArchitechError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_is_non_empty_dir() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("app");
        assert!(!is_non_empty_dir(&root));
        std::fs::create_dir(&root).unwrap();
        assert!(!is_non_empty_dir(&root));
        std::fs::write(root.join("README.md"), "hi").unwrap();
        assert!(is_non_empty_dir(&root));
    }
}
