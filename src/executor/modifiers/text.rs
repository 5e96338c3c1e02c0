//! Line-oriented text modifiers: `text-append`, `regex-replace`, `add-import`

use regex::Regex;

/// Append `content` unless the file already contains it
///
/// Without an explicit separator a newline is inserted only when the file
/// does not already end with one.
pub fn append(existing: Option<&str>, content: &str, separator: Option<&str>) -> String {
    let existing = existing.unwrap_or_default();
    if existing.is_empty() {
        return content.to_string();
    }
    let needle = content.trim();
    if !needle.is_empty() && existing.contains(needle) {
        return existing.to_string();
    }
    let separator = match separator {
        Some(separator) => separator,
        None if existing.ends_with('\n') => "",
        None => "\n",
    };
    format!("{existing}{separator}{content}")
}

/// Replace every match of `pattern`; a pattern that never matches is an error
pub fn regex_replace(existing: &str, pattern: &str, replacement: &str) -> Result<String, String> {
    let regex = Regex::new(pattern).map_err(|e| format!("invalid pattern '{pattern}': {e}"))?;
    if !regex.is_match(existing) {
        return Err(format!("pattern '{pattern}' did not match"));
    }
    Ok(regex.replace_all(existing, replacement).into_owned())
}

/// Insert an import statement after the last existing import
///
/// `import` may be a whole statement (`import { db } from "@/db";`) or the
/// part after the keyword (`{ db } from "@/db"`). Files without imports get
/// the statement at the top, below a leading `"use client"` style directive.
pub fn add_import(existing: &str, import: &str) -> String {
    let statement = normalize_import(import);
    let bare = statement.trim_end_matches(';');
    if existing
        .lines()
        .any(|line| line.trim().trim_end_matches(';') == bare)
    {
        return existing.to_string();
    }

    let lines: Vec<&str> = existing.lines().collect();
    let insert_at = match lines.iter().rposition(|line| is_import_start(line)) {
        Some(start) => {
            let end = (start..lines.len())
                .find(|&i| ends_import(lines[i]))
                .unwrap_or(start);
            end + 1
        }
        None => match lines.first() {
            Some(first) if is_directive(first) => 1,
            _ => 0,
        },
    };

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 2);
    out.extend_from_slice(&lines[..insert_at]);
    out.push(&statement);
    let has_no_imports = !lines.iter().any(|line| is_import_start(line));
    if has_no_imports && lines.get(insert_at).is_some_and(|l| !l.trim().is_empty()) {
        out.push("");
    }
    out.extend_from_slice(&lines[insert_at..]);

    let mut result = out.join("\n");
    if existing.ends_with('\n') || existing.is_empty() {
        result.push('\n');
    }
    result
}

fn normalize_import(import: &str) -> String {
    let import = import.trim();
    let statement = if import.starts_with("import ") || import.starts_with("import{") {
        import.to_string()
    } else {
        format!("import {import}")
    };
    if statement.ends_with(';') {
        statement
    } else {
        format!("{statement};")
    }
}

fn is_import_start(line: &str) -> bool {
    line.starts_with("import ") || line.starts_with("import{")
}

fn ends_import(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.contains(" from ")
        || trimmed.ends_with(';')
        || trimmed.starts_with("import \"")
        || trimmed.starts_with("import '")
}

fn is_directive(line: &str) -> bool {
    let trimmed = line.trim().trim_end_matches(';');
    let quoted = (trimmed.starts_with('"') && trimmed.ends_with('"'))
        || (trimmed.starts_with('\'') && trimmed.ends_with('\''));
    quoted && trimmed.len() > 2
}
