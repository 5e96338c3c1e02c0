//! Structural file modifiers used by `enhance-file` actions
//!
//! Each modifier turns the current content of a file (as seen through the
//! module's VFS) into its new content. Modifiers are pure string functions;
//! the handler stages the result.
//!
//! | Modifier | Missing file |
//! |---|---|
//! | `json-merge` | merges into `{}` |
//! | `text-append` | creates the file |
//! | `env-vars` | creates the file |
//! | `regex-replace`, `add-import`, `jsx-wrap`, `config-property` | error |

pub mod config;
pub mod json;
pub mod jsx;
pub mod text;

use crate::domain::Enhancement;

use super::ActionError;

/// Apply an enhancement to the current content of `path`
pub fn apply(path: &str, enhancement: &Enhancement, existing: Option<&str>) -> Result<String, ActionError> {
    let fail = |reason: String| ActionError::modifier(path, enhancement.name(), reason);
    let require = || existing.ok_or_else(|| fail("file does not exist".to_string()));

    match enhancement {
        Enhancement::JsonMerge { value, strategy } => json::merge(existing, value, *strategy).map_err(fail),
        Enhancement::TextAppend { content, separator } => {
            Ok(text::append(existing, content, separator.as_deref()))
        }
        Enhancement::RegexReplace {
            pattern,
            replacement,
        } => text::regex_replace(require()?, pattern, replacement).map_err(fail),
        Enhancement::AddImport { import } => Ok(text::add_import(require()?, import)),
        Enhancement::JsxWrap {
            component,
            props,
            target,
        } => jsx::wrap(require()?, component, props, target.as_deref()).map_err(fail),
        Enhancement::ConfigProperty { anchor, property } => {
            config::insert_property(require()?, anchor, property).map_err(fail)
        }
        Enhancement::EnvVars { vars } => Ok(config::add_env_vars(existing, vars)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_requiring_file_fails_on_missing_file() {
        let enhancement = Enhancement::AddImport {
            import: "x from \"y\"".to_string(),
        };
        match apply("src/app/page.tsx", &enhancement, None).unwrap_err() {
            ActionError::ModifierFailed {
                path,
                modifier,
                reason,
            } => {
                assert_eq!(path, "src/app/page.tsx");
                assert_eq!(modifier, "add-import");
                assert_eq!(reason, "file does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failure_carries_modifier_name() {
        let enhancement = Enhancement::RegexReplace {
            pattern: "nope".to_string(),
            replacement: String::new(),
        };
        let err = apply("a.ts", &enhancement, Some("content")).unwrap_err();
        assert!(matches!(err, ActionError::ModifierFailed { ref modifier, .. } if modifier == "regex-replace"));
    }
}
