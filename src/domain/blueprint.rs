//! Blueprint domain types
//!
//! A blueprint is the ordered list of actions a module performs when it is
//! installed. Blueprints are declared in `blueprint.yaml`:
//!
//! ```yaml
//! id: drizzle-setup
//! actions:
//!   - type: run-command
//!     command: npm install drizzle-orm
//!   - type: create-file
//!     path: drizzle.config.ts
//!     content: |
//!       export default { dialect: "{{params.dialect}}" };
//!   - type: enhance-file
//!     path: package.json
//!     modifier: json-merge
//!     params:
//!       value: { scripts: { "db:push": "drizzle-kit push" } }
//! ```
//!
//! Modifier parameters are a tagged union, so a blueprint with a misspelled
//! modifier or a missing parameter fails when it is loaded, not halfway
//! through a module's transaction.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

use serde::Deserialize;

use crate::executor::template::mask_variables;

/// JSON merge behaviour for the `json-merge` modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Recursive merge; arrays are appended without duplicates
    #[default]
    Deep,
    /// Top-level keys only; nested values are replaced
    Shallow,
}

/// A structural file modifier with its validated parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "modifier", content = "params", rename_all = "kebab-case")]
pub enum Enhancement {
    /// Merge a JSON value into a JSON file
    JsonMerge {
        value: serde_json::Value,
        #[serde(default)]
        strategy: MergeStrategy,
    },
    /// Append text, skipping it when already present
    TextAppend {
        content: String,
        #[serde(default)]
        separator: Option<String>,
    },
    /// Regex search and replace; the pattern must match at least once
    RegexReplace { pattern: String, replacement: String },
    /// Insert an import statement after the existing imports
    AddImport { import: String },
    /// Wrap a JSX expression (default `{children}`) in a component
    JsxWrap {
        component: String,
        #[serde(default)]
        props: BTreeMap<String, String>,
        #[serde(default)]
        target: Option<String>,
    },
    /// Insert a property line after the line containing `anchor`
    ConfigProperty { anchor: String, property: String },
    /// Add `KEY=value` lines to a dotenv file, keeping existing keys
    EnvVars { vars: BTreeMap<String, String> },
}

impl Enhancement {
    /// Modifier name as written in blueprints
    pub fn name(&self) -> &'static str {
        match self {
            Enhancement::JsonMerge { .. } => "json-merge",
            Enhancement::TextAppend { .. } => "text-append",
            Enhancement::RegexReplace { .. } => "regex-replace",
            Enhancement::AddImport { .. } => "add-import",
            Enhancement::JsxWrap { .. } => "jsx-wrap",
            Enhancement::ConfigProperty { .. } => "config-property",
            Enhancement::EnvVars { .. } => "env-vars",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Enhancement::JsonMerge { value, strategy } => {
                if *strategy == MergeStrategy::Shallow && !value.is_object() {
                    return Err("json-merge with shallow strategy needs an object value".into());
                }
                Ok(())
            }
            Enhancement::RegexReplace { pattern, .. } => {
                regex::Regex::new(&mask_variables(pattern, "x"))
                    .map(|_| ())
                    .map_err(|e| format!("invalid pattern '{pattern}': {e}"))
            }
            Enhancement::AddImport { import } if import.trim().is_empty() => {
                Err("add-import needs a non-empty import".into())
            }
            Enhancement::JsxWrap { component, .. } if component.trim().is_empty() => {
                Err("jsx-wrap needs a component name".into())
            }
            Enhancement::ConfigProperty { anchor, property }
                if anchor.is_empty() || property.trim().is_empty() =>
            {
                Err("config-property needs an anchor and a property".into())
            }
            Enhancement::EnvVars { vars } if vars.keys().any(|k| k.is_empty() || k.contains('=')) => {
                Err("env-vars keys must be non-empty and must not contain '='".into())
            }
            _ => Ok(()),
        }
    }
}

/// Action type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    CreateFile,
    EnhanceFile,
    RunCommand,
    DeleteFile,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::CreateFile => "create-file",
            ActionKind::EnhanceFile => "enhance-file",
            ActionKind::RunCommand => "run-command",
            ActionKind::DeleteFile => "delete-file",
        })
    }
}

/// One blueprint step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    CreateFile {
        path: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        overwrite: bool,
    },
    EnhanceFile {
        path: String,
        #[serde(flatten)]
        enhancement: Enhancement,
    },
    RunCommand {
        command: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    DeleteFile {
        path: String,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateFile { .. } => ActionKind::CreateFile,
            Action::EnhanceFile { .. } => ActionKind::EnhanceFile,
            Action::RunCommand { .. } => ActionKind::RunCommand,
            Action::DeleteFile { .. } => ActionKind::DeleteFile,
        }
    }

    /// Target path for file actions
    pub fn path(&self) -> Option<&str> {
        match self {
            Action::CreateFile { path, .. }
            | Action::EnhanceFile { path, .. }
            | Action::DeleteFile { path } => Some(path),
            Action::RunCommand { .. } => None,
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            Action::CreateFile { path, .. } => format!("create {path}"),
            Action::EnhanceFile { path, enhancement } => {
                format!("enhance {path} ({})", enhancement.name())
            }
            Action::RunCommand { command, .. } => format!("run `{command}`"),
            Action::DeleteFile { path } => format!("delete {path}"),
        }
    }
}

/// A module's ordered installation instructions
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Blueprint {
    pub id: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Blueprint {
    /// Parse and validate a blueprint from YAML
    pub fn from_yaml(source: &str) -> Result<Self, String> {
        let blueprint: Blueprint = serde_yaml::from_str(source).map_err(|e| e.to_string())?;
        blueprint.validate()?;
        Ok(blueprint)
    }

    /// Check the load-time invariants
    ///
    /// Commands run against the real project directory and cannot see files a
    /// module has only staged, so a `run-command` must not follow a file action.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("blueprint id is empty".into());
        }

        let mut first_file_action: Option<usize> = None;
        for (index, action) in self.actions.iter().enumerate() {
            if let Some(path) = action.path() {
                validate_relative_path(path).map_err(|e| format!("action #{index}: {e}"))?;
                first_file_action.get_or_insert(index);
            }
            match action {
                Action::EnhanceFile { enhancement, .. } => {
                    enhancement
                        .validate()
                        .map_err(|e| format!("action #{index}: {e}"))?;
                }
                Action::RunCommand { command, .. } => {
                    if command.trim().is_empty() {
                        return Err(format!("action #{index}: command is empty"));
                    }
                    if let Some(file_index) = first_file_action {
                        return Err(format!(
                            "action #{index}: run-command follows file action #{file_index}; \
                             commands must come before file actions in a blueprint"
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Reject absolute paths and paths that climb out of the project root
pub fn validate_relative_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("path is empty".into());
    }
    let parsed = Path::new(path);
    let mut depth: usize = 0;
    for component in parsed.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("path '{path}' escapes the project root"))?;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("path '{path}' must be relative"));
            }
        }
    }
    if depth == 0 {
        return Err(format!("path '{path}' does not name a file"));
    }
    Ok(())
}
