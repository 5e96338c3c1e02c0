//! Blueprint templating
//!
//! Paths, file content, commands and modifier strings may reference:
//!
//! - `{{project.name}}`, `{{project.path}}`, `{{project.framework}}`,
//!   `{{project.version}}`
//! - `{{module.id}}`, `{{module.version}}`, `{{module.category}}`
//! - `{{params.<key>}}`, including nested keys (`{{params.db.host}}`)
//!
//! Only `{{ ... }}` spans whose body is a dotted identifier rooted at
//! `project`, `module` or `params` are variables. Anything else, such as the
//! JSX object literal in `style={{ color: "red" }}`, is copied verbatim.
//! A variable that does not resolve fails the action.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::config::ProjectSpec;
use crate::domain::{Enhancement, ResolvedModule};

use super::ActionError;

const ROOTS: [&str; 3] = ["project", "module", "params"];

/// Variables visible to one module's blueprint
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    project: BTreeMap<&'static str, String>,
    module: BTreeMap<&'static str, String>,
    params: BTreeMap<String, JsonValue>,
}

impl TemplateContext {
    pub fn new(project: &ProjectSpec, project_root: &Path, module: &ResolvedModule) -> Self {
        let project = BTreeMap::from([
            ("name", project.name.clone()),
            ("path", project_root.display().to_string()),
            ("framework", project.framework.clone()),
            ("version", project.version.clone()),
        ]);
        let module_vars = BTreeMap::from([
            ("id", module.id().to_string()),
            ("version", module.module.version.clone()),
            ("category", module.category().as_str().to_string()),
        ]);
        Self {
            project,
            module: module_vars,
            params: module.parameters.clone(),
        }
    }

    /// Substitute every variable in `input`
    pub fn render(&self, input: &str) -> Result<String, ActionError> {
        substitute(input, |variable| self.lookup(variable))
    }

    /// Render every string parameter of a modifier, including JSON leaves
    pub fn render_enhancement(&self, enhancement: &Enhancement) -> Result<Enhancement, ActionError> {
        Ok(match enhancement {
            Enhancement::JsonMerge { value, strategy } => Enhancement::JsonMerge {
                value: self.render_json(value)?,
                strategy: *strategy,
            },
            Enhancement::TextAppend { content, separator } => Enhancement::TextAppend {
                content: self.render(content)?,
                separator: separator.clone(),
            },
            Enhancement::RegexReplace {
                pattern,
                replacement,
            } => Enhancement::RegexReplace {
                pattern: self.render(pattern)?,
                replacement: self.render(replacement)?,
            },
            Enhancement::AddImport { import } => Enhancement::AddImport {
                import: self.render(import)?,
            },
            Enhancement::JsxWrap {
                component,
                props,
                target,
            } => Enhancement::JsxWrap {
                component: self.render(component)?,
                props: self.render_map(props)?,
                target: target.as_deref().map(|t| self.render(t)).transpose()?,
            },
            Enhancement::ConfigProperty { anchor, property } => Enhancement::ConfigProperty {
                anchor: self.render(anchor)?,
                property: self.render(property)?,
            },
            Enhancement::EnvVars { vars } => Enhancement::EnvVars {
                vars: self.render_map(vars)?,
            },
        })
    }

    fn render_map(&self, map: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>, ActionError> {
        map.iter()
            .map(|(k, v)| Ok((k.clone(), self.render(v)?)))
            .collect()
    }

    fn render_json(&self, value: &JsonValue) -> Result<JsonValue, ActionError> {
        Ok(match value {
            JsonValue::String(s) => JsonValue::String(self.render(s)?),
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.render_json(item))
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(map) => {
                let mut rendered = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    rendered.insert(key.clone(), self.render_json(item)?);
                }
                JsonValue::Object(rendered)
            }
            other => other.clone(),
        })
    }

    fn lookup(&self, variable: &str) -> Result<String, ActionError> {
        let unknown = || ActionError::Template(format!("unknown variable '{variable}'"));
        let (root, path) = variable.split_once('.').ok_or_else(unknown)?;
        match root {
            "project" => self.project.get(path).cloned().ok_or_else(unknown),
            "module" => self.module.get(path).cloned().ok_or_else(unknown),
            _ => {
                let mut segments = path.split('.');
                let first = segments.next().ok_or_else(unknown)?;
                let mut value = self.params.get(first).ok_or_else(unknown)?;
                for segment in segments {
                    value = value.get(segment).ok_or_else(unknown)?;
                }
                Ok(match value {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
            }
        }
    }
}

/// Replace every variable span with `placeholder`
///
/// Lets load-time checks (regex compilation) see a pattern without the
/// `{{ }}` spans that are only filled in at execution.
pub fn mask_variables(input: &str, placeholder: &str) -> String {
    substitute(input, |_| Ok::<_, std::convert::Infallible>(placeholder.to_string()))
        .unwrap_or_else(|never| match never {})
}

fn substitute<E>(input: &str, mut value: impl FnMut(&str) -> Result<String, E>) -> Result<String, E> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let body = after[..close].trim();
        if is_variable(body) {
            out.push_str(&value(body)?);
            rest = &after[close + 2..];
        } else {
            out.push_str("{{");
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn is_variable(body: &str) -> bool {
    let Some((root, rest)) = body.split_once('.') else {
        return false;
    };
    ROOTS.contains(&root)
        && !rest.is_empty()
        && rest.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}
