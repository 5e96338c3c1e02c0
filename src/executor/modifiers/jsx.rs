//! `jsx-wrap` modifier
//!
//! Wraps the first occurrence of a JSX expression in a component:
//!
//! ```text
//! <body>
//!   {children}
//! </body>
//! ```
//!
//! with `component: Providers` becomes
//!
//! ```text
//! <body>
//!   <Providers>
//!     {children}
//!   </Providers>
//! </body>
//! ```

use std::collections::BTreeMap;

pub const DEFAULT_TARGET: &str = "{children}";

pub fn wrap(
    existing: &str,
    component: &str,
    props: &BTreeMap<String, String>,
    target: Option<&str>,
) -> Result<String, String> {
    let target = target.unwrap_or(DEFAULT_TARGET);
    let open_tag = format!("<{component}");
    let close_tag = format!("</{component}>");
    if has_open_tag(existing, &open_tag) && existing.contains(&close_tag) {
        return Ok(existing.to_string());
    }

    let at = existing
        .find(target)
        .ok_or_else(|| format!("target '{target}' not found"))?;
    let line_start = existing[..at].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &existing[line_start..at];
    let indent: String = if prefix.trim().is_empty() {
        prefix.to_string()
    } else {
        prefix.chars().take_while(|c| c.is_whitespace()).collect()
    };

    let mut open = open_tag;
    for (name, value) in props {
        if value.starts_with('{') && value.ends_with('}') {
            open.push_str(&format!(" {name}={value}"));
        } else {
            open.push_str(&format!(" {name}=\"{value}\""));
        }
    }
    open.push('>');

    let wrapped = format!("{open}\n{indent}  {target}\n{indent}{close_tag}");
    let mut out = String::with_capacity(existing.len() + wrapped.len());
    out.push_str(&existing[..at]);
    out.push_str(&wrapped);
    out.push_str(&existing[at + target.len()..]);
    Ok(out)
}

/// `<Name` followed by `>`, `/` or whitespace, so `<ProvidersShell` is not `<Providers`
fn has_open_tag(text: &str, open_tag: &str) -> bool {
    text.match_indices(open_tag).any(|(at, _)| {
        text[at + open_tag.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c == '/' || c.is_whitespace())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "export default function RootLayout({ children }) {\n  return (\n    <html>\n      <body>\n        {children}\n      </body>\n    </html>\n  );\n}\n";

    #[test]
    fn test_wraps_children_with_indentation() {
        let out = wrap(LAYOUT, "Providers", &BTreeMap::new(), None).unwrap();
        assert!(out.contains(
            "      <body>\n        <Providers>\n          {children}\n        </Providers>\n      </body>"
        ));
        // Function signature destructuring is untouched
        assert!(out.starts_with("export default function RootLayout({ children })"));
    }

    #[test]
    fn test_props_render_as_attributes() {
        let mut props = BTreeMap::new();
        props.insert("attribute".to_string(), "class".to_string());
        props.insert("enableSystem".to_string(), "{true}".to_string());
        let out = wrap(LAYOUT, "ThemeProvider", &props, None).unwrap();
        assert!(out.contains("<ThemeProvider attribute=\"class\" enableSystem={true}>"));
    }

    #[test]
    fn test_already_wrapped_is_unchanged() {
        let once = wrap(LAYOUT, "Providers", &BTreeMap::new(), None).unwrap();
        assert_eq!(wrap(&once, "Providers", &BTreeMap::new(), None).unwrap(), once);
    }

    #[test]
    fn test_longer_component_name_does_not_count_as_wrapped() {
        let layout = LAYOUT.replace(
            "<body>",
            "<body>\n        <ProvidersShell></ProvidersShell>\n        <Providers.Inner />\n        </Providers>",
        );
        let out = wrap(&layout, "Providers", &BTreeMap::new(), None).unwrap();
        assert!(out.contains("<Providers>\n          {children}\n        </Providers>"));
    }

    #[test]
    fn test_missing_target_fails() {
        let err = wrap("<div />", "Providers", &BTreeMap::new(), Some("<Main />")).unwrap_err();
        assert!(err.contains("<Main />"));
    }
}
