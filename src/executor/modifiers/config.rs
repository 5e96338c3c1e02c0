//! Configuration file modifiers: `config-property`, `env-vars`

use std::collections::BTreeMap;

/// Insert `property` on the line after the first line containing `anchor`
///
/// The property is indented one level deeper when the anchor line opens a
/// block (`{`, `[` or `(`), otherwise it takes the anchor's indentation.
/// Nothing changes when the file already contains the property.
pub fn insert_property(existing: &str, anchor: &str, property: &str) -> Result<String, String> {
    let property = property.trim_end();
    if existing.contains(property.trim()) {
        return Ok(existing.to_string());
    }

    let lines: Vec<&str> = existing.lines().collect();
    let index = lines
        .iter()
        .position(|line| line.contains(anchor))
        .ok_or_else(|| format!("anchor '{anchor}' not found"))?;

    let anchor_line = lines[index];
    let mut indent: String = anchor_line.chars().take_while(|c| c.is_whitespace()).collect();
    if anchor_line.trim_end().ends_with(['{', '[', '(']) {
        indent.push_str("  ");
    }

    let mut out: Vec<String> = lines[..=index].iter().map(|l| l.to_string()).collect();
    out.extend(property.lines().map(|line| {
        if line.trim().is_empty() {
            String::new()
        } else {
            format!("{indent}{}", line.trim_start())
        }
    }));
    out.extend(lines[index + 1..].iter().map(|l| l.to_string()));

    let mut result = out.join("\n");
    if existing.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

/// Add `KEY=value` lines for keys the dotenv file does not define yet
pub fn add_env_vars(existing: Option<&str>, vars: &BTreeMap<String, String>) -> String {
    let existing = existing.unwrap_or_default();
    let defined: Vec<&str> = existing
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.trim_start_matches("export ").split_once('='))
        .map(|(key, _)| key.trim())
        .collect();

    let mut result = existing.to_string();
    for (key, value) in vars {
        if defined.contains(&key.as_str()) {
            continue;
        }
        if !result.is_empty() && !result.ends_with('\n') {
            result.push('\n');
        }
        result.push_str(&format!("{key}={}\n", quote_env_value(value)));
    }
    result
}

fn quote_env_value(value: &str) -> String {
    if value.is_empty() || !value.contains(|c: char| c.is_whitespace() || c == '#' || c == '"') {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
