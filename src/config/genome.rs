//! Genome (project description) data structures
//!
//! ```yaml
//! project:
//!   name: my-saas
//!   path: ./my-saas
//!   framework: nextjs
//!   version: 0.1.0
//! modules:
//!   - id: adapter/drizzle
//!     parameters:
//!       dialect: postgres
//! features:
//!   - auth
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{
    Result,
    config::{not_found as config_not_found, parse_failed as config_parse_failed},
    validation::failed as validation_failed,
};

/// Frameworks a genome may target
pub const SUPPORTED_FRAMEWORKS: &[&str] = &[
    "nextjs", "react", "vue", "svelte", "astro", "remix", "express", "nestjs",
];

/// Package managers the dependency installer knows how to drive
pub const SUPPORTED_PACKAGE_MANAGERS: &[&str] = &["npm", "pnpm", "yarn", "bun"];

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Project section of a genome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default)]
    pub name: String,

    /// Project directory, relative to the working directory
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub framework: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
}

/// A module requested by the genome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeModule {
    pub id: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl GenomeModule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parameters: BTreeMap::new(),
        }
    }
}

/// Declarative project description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub project: ProjectSpec,

    #[serde(default)]
    pub modules: Vec<GenomeModule>,

    /// High-level feature requests expanded against the detected stack
    #[serde(default)]
    pub features: Vec<String>,
}

impl Genome {
    /// Parse a genome from YAML without validating it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a genome file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(config_not_found(path.display().to_string()));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
    }

    /// Project directory, resolving a relative path against `base`
    pub fn project_root(&self, base: &Path) -> PathBuf {
        let path = Path::new(&self.project.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    /// Package manager for dependency installation, falling back to `default`
    pub fn package_manager<'a>(&'a self, default: &'a str) -> &'a str {
        self.project.package_manager.as_deref().unwrap_or(default)
    }

    /// Validate the genome, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut messages = Vec::new();
        let project = &self.project;

        if project.name.trim().is_empty() {
            messages.push("project.name is required".to_string());
        } else if !is_kebab_case(&project.name) {
            messages.push(format!(
                "project.name '{}' must be kebab-case (lowercase letters, digits and single dashes)",
                project.name
            ));
        }

        if project.path.trim().is_empty() {
            messages.push("project.path is required".to_string());
        }

        if project.framework.trim().is_empty() {
            messages.push("project.framework is required".to_string());
        } else if !SUPPORTED_FRAMEWORKS.contains(&project.framework.as_str()) {
            messages.push(format!(
                "project.framework '{}' is not supported (expected one of: {})",
                project.framework,
                SUPPORTED_FRAMEWORKS.join(", ")
            ));
        }

        if semver::Version::parse(&project.version).is_err() {
            messages.push(format!(
                "project.version '{}' is not a semantic version",
                project.version
            ));
        }

        if let Some(pm) = &project.package_manager {
            if !SUPPORTED_PACKAGE_MANAGERS.contains(&pm.as_str()) {
                messages.push(format!(
                    "project.package_manager '{}' is not supported (expected one of: {})",
                    pm,
                    SUPPORTED_PACKAGE_MANAGERS.join(", ")
                ));
            }
        }

        for (index, module) in self.modules.iter().enumerate() {
            if module.id.trim().is_empty() {
                messages.push(format!("modules[{index}].id is required"));
            }
        }
        for (index, feature) in self.features.iter().enumerate() {
            if feature.trim().is_empty() {
                messages.push(format!("features[{index}] is empty"));
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(validation_failed(messages))
        }
    }
}

/// `my-app`, `app2`; no leading, trailing or doubled dashes
fn is_kebab_case(name: &str) -> bool {
    !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
