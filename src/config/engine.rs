//! Engine configuration
//!
//! Layered from lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `config.yaml` (explicit `--config` path, or `<config_dir>/architech/config.yaml`)
//! 3. Environment: `ARCHITECH_CACHE_DIR`, `ARCHITECH_MODULES_DIR`
//! 4. Command line flags, applied by the commands

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheLimits, default_cache_dir};
use crate::error::{
    Result,
    config::{invalid as config_invalid, not_found as config_not_found, parse_failed as config_parse_failed},
};

use super::genome::SUPPORTED_PACKAGE_MANAGERS;

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "ARCHITECH_CACHE_DIR";

/// Environment variable overriding the modules directory
pub const MODULES_DIR_ENV: &str = "ARCHITECH_MODULES_DIR";

const CONFIG_DIR: &str = "architech";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_MODULES_DIR: &str = "modules";

/// Engine settings shared by every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Module registry root
    pub modules_dir: Option<PathBuf>,
    /// Blueprint cache root
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age_secs: u64,
    pub cache_max_size_bytes: u64,
    /// Hard timeout for each `run-command` action
    pub command_timeout_secs: u64,
    /// Run modules of a parallel batch concurrently
    pub parallel: bool,
    /// Package manager used when the genome names none
    pub package_manager: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = CacheLimits::default();
        Self {
            modules_dir: None,
            cache_dir: None,
            cache_max_age_secs: limits.max_age.as_secs(),
            cache_max_size_bytes: limits.max_size_bytes,
            command_timeout_secs: 300,
            parallel: true,
            package_manager: "npm".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file, then apply environment overrides
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) if !path.is_file() => return Err(config_not_found(path.display().to_string())),
            Some(path) => Self::read_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::read_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
    }

    /// Apply environment overrides through an injectable lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(MODULES_DIR_ENV).filter(|v| !v.is_empty()) {
            self.modules_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_secs == 0 {
            return Err(config_invalid("command_timeout_secs must be greater than zero"));
        }
        if self.cache_max_size_bytes == 0 {
            return Err(config_invalid("cache_max_size_bytes must be greater than zero"));
        }
        if !SUPPORTED_PACKAGE_MANAGERS.contains(&self.package_manager.as_str()) {
            return Err(config_invalid(format!(
                "package_manager '{}' is not supported (expected one of: {})",
                self.package_manager,
                SUPPORTED_PACKAGE_MANAGERS.join(", ")
            )));
        }
        Ok(())
    }

    /// Configured cache directory, or the platform default
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir(),
        }
    }

    /// Configured modules directory, or `./modules`
    pub fn modules_dir(&self) -> PathBuf {
        self.modules_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULES_DIR))
    }

    pub fn cache_limits(&self) -> CacheLimits {
        CacheLimits {
            max_age: Duration::from_secs(self.cache_max_age_secs),
            max_size_bytes: self.cache_max_size_bytes,
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
