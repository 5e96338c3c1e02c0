//! `json-merge` modifier
//!
//! ### Shallow
//!
//! Top-level keys from the new value override existing keys; nested objects
//! are replaced entirely.
//!
//! ```json
//! Existing: {"a": 1, "b": {"x": 1, "y": 2}}
//! New:      {"b": {"y": 3, "z": 4}, "c": 3}
//! Result:    {"a": 1, "b": {"y": 3, "z": 4}, "c": 3}
//! ```
//!
//! ### Deep
//!
//! Objects merge recursively. Arrays are appended without duplicates.
//!
//! ```json
//! Existing: {"a": 1, "b": {"x": 1, "y": 2}, "items": [1, 2]}
//! New:      {"b": {"y": 3, "z": 4}, "items": [2, 3]}
//! Result:    {"a": 1, "b": {"x": 1, "y": 3, "z": 4}, "items": [1, 2, 3]}
//! ```
//!
//! A missing or empty file merges into `{}`.

use serde_json::Value as JsonValue;

use crate::domain::MergeStrategy;

/// Merge `value` into the JSON text of `existing`
pub fn merge(existing: Option<&str>, value: &JsonValue, strategy: MergeStrategy) -> Result<String, String> {
    let base = match existing.map(str::trim) {
        None | Some("") => JsonValue::Object(serde_json::Map::new()),
        Some(text) => serde_json::from_str(text).map_err(|e| format!("not valid JSON: {e}"))?,
    };

    let merged = match strategy {
        MergeStrategy::Shallow => merge_json_shallow(base, value.clone()),
        MergeStrategy::Deep => merge_json_deep(base, value.clone()),
    };

    let mut text = serde_json::to_string_pretty(&merged).map_err(|e| e.to_string())?;
    text.push('\n');
    Ok(text)
}

fn merge_json_shallow(mut existing: JsonValue, new: JsonValue) -> JsonValue {
    match (&mut existing, new) {
        (JsonValue::Object(existing_map), JsonValue::Object(new_map)) => {
            for (key, value) in new_map {
                existing_map.insert(key, value);
            }
            existing
        }
        (_, new) => new,
    }
}

fn merge_json_deep(existing: JsonValue, new: JsonValue) -> JsonValue {
    match (existing, new) {
        (JsonValue::Object(mut existing_map), JsonValue::Object(new_map)) => {
            for (key, new_value) in new_map {
                match existing_map.get_mut(&key) {
                    Some(slot) => *slot = merge_json_deep(slot.take(), new_value),
                    None => {
                        existing_map.insert(key, new_value);
                    }
                }
            }
            JsonValue::Object(existing_map)
        }
        (JsonValue::Array(mut existing_arr), JsonValue::Array(new_arr)) => {
            for item in new_arr {
                if !existing_arr.contains(&item) {
                    existing_arr.push(item);
                }
            }
            JsonValue::Array(existing_arr)
        }
        (_, new) => new,
    }
}
