//! Module domain types
//!
//! A module is a unit of installable functionality: a framework, an adapter,
//! an integration or a feature. Modules are loaded once from the registry and
//! never mutated afterwards; their identity is the `id`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, config::invalid as config_invalid};

/// Module category, which doubles as its execution phase
///
/// The declaration order is the mandatory phase order: frameworks scaffold the
/// tree that adapters and integrations assume, features come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    Framework,
    Adapter,
    Integration,
    Feature,
}

impl ModuleCategory {
    /// All categories in phase order
    pub const ALL: [ModuleCategory; 4] = [
        ModuleCategory::Framework,
        ModuleCategory::Adapter,
        ModuleCategory::Integration,
        ModuleCategory::Feature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleCategory::Framework => "framework",
            ModuleCategory::Adapter => "adapter",
            ModuleCategory::Integration => "integration",
            ModuleCategory::Feature => "feature",
        }
    }

    /// Parse a category from its lowercase name
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability a module needs from another module
///
/// In YAML either a bare capability name, which must be satisfied by exactly
/// one provider, or a mapping that allows several providers:
///
/// ```yaml
/// requires:
///   - database-driver
///   - capability: ui-components
///     multiple: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityRequirement {
    Exactly(String),
    Spec {
        capability: String,
        #[serde(default)]
        multiple: bool,
    },
}

impl CapabilityRequirement {
    pub fn capability(&self) -> &str {
        match self {
            CapabilityRequirement::Exactly(name) => name,
            CapabilityRequirement::Spec { capability, .. } => capability,
        }
    }

    pub fn accepts_multiple(&self) -> bool {
        matches!(self, CapabilityRequirement::Spec { multiple: true, .. })
    }
}

/// A module definition as declared in `module.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Hierarchical id, e.g. `adapter/drizzle`
    pub id: String,

    pub category: ModuleCategory,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default parameters, overridden per genome entry
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Capabilities this module provides
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub provides: BTreeSet<String>,

    /// Capabilities this module requires
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<CapabilityRequirement>,

    /// Module ids this module depends on (capability names are accepted too)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub incompatible_with: BTreeSet<String>,

    /// Feature name this module realises during feature expansion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,

    /// Stack conditions for feature expansion, e.g. `framework: nextjs`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub when: BTreeMap<String, String>,

    /// Frameworks this module supports; empty means any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,

    /// Directory structure a framework module enforces before other modules run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<String>,

    /// Directory the registry loaded this module from
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl Module {
    /// Create a module with only the required fields set
    pub fn new(id: impl Into<String>, category: ModuleCategory, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            version: version.into(),
            description: None,
            parameters: BTreeMap::new(),
            provides: BTreeSet::new(),
            requires: Vec::new(),
            dependencies: Vec::new(),
            incompatible_with: BTreeSet::new(),
            feature: None,
            when: BTreeMap::new(),
            frameworks: Vec::new(),
            directories: Vec::new(),
            source_dir: None,
        }
    }

    /// Last segment of the id (`adapter/drizzle` -> `drizzle`)
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }

    /// Whether this module can be used with the given framework
    pub fn supports_framework(&self, framework: &str) -> bool {
        self.frameworks.is_empty() || self.frameworks.iter().any(|f| f == framework)
    }

    /// Cache key segment, `<id>@<version>`
    pub fn key(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }

    /// Check the manifest invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        let segments: Vec<&str> = self.id.split('/').collect();
        if segments.len() < 2 || segments.iter().any(|s| !is_id_segment(s)) {
            return Err(config_invalid(format!(
                "module id '{}' must be hierarchical lowercase segments like 'adapter/drizzle'",
                self.id
            )));
        }
        if semver::Version::parse(&self.version).is_err() {
            return Err(config_invalid(format!(
                "module '{}' has invalid version '{}'",
                self.id, self.version
            )));
        }
        if !self.directories.is_empty() && self.category != ModuleCategory::Framework {
            return Err(config_invalid(format!(
                "module '{}' declares directories but only framework modules may",
                self.id
            )));
        }
        if let Some(reason) = self
            .directories
            .iter()
            .find_map(|dir| super::blueprint::validate_relative_path(dir).err())
        {
            return Err(config_invalid(format!("module '{}': {reason}", self.id)));
        }
        if self.incompatible_with.contains(&self.id) || self.dependencies.contains(&self.id) {
            return Err(config_invalid(format!(
                "module '{}' references itself",
                self.id
            )));
        }
        Ok(())
    }
}

fn is_id_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
}
