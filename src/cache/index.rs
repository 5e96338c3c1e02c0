//! Cache index management
//!
//! The index is a JSON list of entries at `<cache>/index.json`. Blob contents
//! live next to it under `blobs/`, named by their content hash.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, cache::operation_failed as cache_failed};

/// File name for the cache index at the cache root
pub const INDEX_FILE: &str = "index.json";

/// Single entry in the cache index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub module_id: String,
    pub version: String,
    pub content_hash: String,
    /// Blob size in bytes
    pub size: u64,
    /// Unix seconds of the last read or write
    pub last_accessed: u64,
    /// Unix seconds of the first write
    pub created: u64,
}

impl CacheEntry {
    pub fn matches(&self, module_id: &str, version: &str) -> bool {
        self.module_id == module_id && self.version == version
    }

    /// Whether the entry has gone unread for longer than `max_age_secs`
    pub fn is_expired(&self, now: u64, max_age_secs: u64) -> bool {
        now.saturating_sub(self.last_accessed) > max_age_secs
    }
}

/// Read index from disk; a missing index is empty
pub fn read_index(root: &Path) -> Result<Vec<CacheEntry>> {
    let index_path = root.join(INDEX_FILE);
    if !index_path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&index_path).map_err(|e| {
        cache_failed(format!(
            "Failed to read index file {}: {}",
            index_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        cache_failed(format!(
            "Failed to parse index file {}: {}",
            index_path.display(),
            e
        ))
    })
}

/// Write index to disk atomically
pub fn write_index(root: &Path, entries: &[CacheEntry]) -> Result<()> {
    fs::create_dir_all(root)
        .map_err(|e| cache_failed(format!("Failed to create cache directory: {e}")))?;
    let index_path = root.join(INDEX_FILE);

    let content = serde_json::to_string_pretty(entries)
        .map_err(|e| cache_failed(format!("Failed to serialize index: {e}")))?;

    let mut temp = tempfile::NamedTempFile::new_in(root)
        .map_err(|e| cache_failed(format!("Failed to create temporary index: {e}")))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| cache_failed(format!("Failed to write temporary index: {e}")))?;
    temp.persist(&index_path).map_err(|e| {
        cache_failed(format!(
            "Failed to write index file {}: {}",
            index_path.display(),
            e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(module_id: &str, last_accessed: u64) -> CacheEntry {
        CacheEntry {
            module_id: module_id.to_string(),
            version: "1.0.0".to_string(),
            content_hash: "blake3:abc".to_string(),
            size: 10,
            last_accessed,
            created: last_accessed,
        }
    }

    #[test]
    fn test_missing_index_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(read_index(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read_index() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("cache");
        write_index(&root, &[entry("adapter/drizzle", 5)]).unwrap();

        let entries = read_index(&root).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].matches("adapter/drizzle", "1.0.0"));
        assert!(!entries[0].matches("adapter/drizzle", "2.0.0"));
    }

    #[test]
    fn test_corrupt_index_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(INDEX_FILE), "{not json").unwrap();
        let err = read_index(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse index file"));
    }

    #[test]
    fn test_is_expired() {
        let e = entry("a/b", 100);
        assert!(!e.is_expired(150, 50));
        assert!(e.is_expired(151, 50));
        assert!(!e.is_expired(50, 50));
    }
}
