//! Blueprint cache for Architech
//!
//! Read-through cache for module blueprints, keyed by `(module_id, version)`.
//!
//! ## Cache Structure
//!
//! ```text
//! ~/.cache/architech/
//! ├── index.json
//! └── blobs/
//!     └── <blake3-hex>
//! ```
//!
//! Blobs are content addressed, so two module versions with identical
//! blueprints share one blob. Entries expire when they have not been read for
//! longer than the configured age, and a `set` that pushes the total size over
//! the ceiling evicts the least recently accessed quarter of the entries.

pub mod index;
pub mod stats;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Result, cache::operation_failed as cache_failed};
use crate::hash;

pub use index::CacheEntry;
pub use stats::{CacheStats, format_size};

/// Default cache directory name under user's cache directory
const CACHE_DIR: &str = "architech";

/// Blob subdirectory within the cache
const BLOBS_DIR: &str = "blobs";

/// Get the default cache directory path
///
/// Returns `~/.cache/architech` on Unix or equivalent on other platforms.
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir()
        .ok_or_else(|| cache_failed("Could not determine cache directory"))?;
    Ok(base.join(CACHE_DIR))
}

/// Source of the current time, in Unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

/// Cache bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub max_age: Duration,
    pub max_size_bytes: u64,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(86_400),
            max_size_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Content-addressed blueprint cache with an on-disk JSON index
pub struct CacheStore {
    root: PathBuf,
    limits: CacheLimits,
    clock: Arc<dyn Clock>,
    /// In-memory copy of the index; `None` until first read
    index: Mutex<Option<Vec<CacheEntry>>>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("root", &self.root)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, limits: CacheLimits) -> Self {
        Self::with_clock(root, limits, Arc::new(SystemClock))
    }

    pub fn with_clock(root: impl Into<PathBuf>, limits: CacheLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: root.into(),
            limits,
            clock,
            index: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    /// Look up a blueprint; refreshes `last_accessed` on a hit
    ///
    /// Expired entries are purged here rather than by a background sweep.
    pub fn get(&self, module_id: &str, version: &str) -> Result<Option<String>> {
        self.with_index(|store, entries| {
            let now = store.clock.now();
            let Some(pos) = entries.iter().position(|e| e.matches(module_id, version)) else {
                return Ok((None, false));
            };

            if entries[pos].is_expired(now, store.limits.max_age.as_secs()) {
                let expired = entries.remove(pos);
                tracing::debug!(module = %module_id, version, "cache entry expired");
                store.remove_unreferenced_blob(&expired.content_hash, entries)?;
                return Ok((None, true));
            }

            let blob = store.blob_path(&entries[pos].content_hash);
            let content = match fs::read(&blob) {
                Ok(bytes) if hash::verify_content(&entries[pos].content_hash, &bytes) => {
                    String::from_utf8(bytes).ok()
                }
                _ => None,
            };

            match content {
                Some(content) => {
                    entries[pos].last_accessed = now;
                    tracing::debug!(module = %module_id, version, "cache hit");
                    Ok((Some(content), true))
                }
                None => {
                    tracing::warn!(module = %module_id, version, "cache blob missing or corrupt, dropping entry");
                    entries.remove(pos);
                    Ok((None, true))
                }
            }
        })
    }

    /// Insert or overwrite a blueprint, then evict if over the size ceiling
    pub fn set(&self, module_id: &str, version: &str, content: &str) -> Result<()> {
        let content_hash = hash::hash_content(content.as_bytes());

        // Blob and entry are written under the same lock as eviction
        self.with_index(|store, entries| {
            store.write_blob(&content_hash, content.as_bytes())?;
            let now = store.clock.now();
            let size = content.len() as u64;

            match entries.iter_mut().find(|e| e.matches(module_id, version)) {
                Some(entry) => {
                    let previous = std::mem::replace(&mut entry.content_hash, content_hash.clone());
                    entry.size = size;
                    entry.last_accessed = now;
                    if previous != content_hash {
                        store.remove_unreferenced_blob(&previous, entries)?;
                    }
                }
                None => entries.push(CacheEntry {
                    module_id: module_id.to_string(),
                    version: version.to_string(),
                    content_hash: content_hash.clone(),
                    size,
                    last_accessed: now,
                    created: now,
                }),
            }

            store.evict_if_needed(entries)?;
            Ok(((), true))
        })
    }

    /// Remove every version of a module, returning how many entries went away
    pub fn remove(&self, module_id: &str) -> Result<usize> {
        self.with_index(|store, entries| {
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(entries)
                .into_iter()
                .partition(|e| e.module_id == module_id);
            *entries = kept;

            if removed.is_empty() {
                return Err(cache_failed(format!(
                    "Module not found in cache: {module_id}"
                )));
            }
            for entry in &removed {
                store.remove_unreferenced_blob(&entry.content_hash, entries)?;
            }
            Ok((removed.len(), true))
        })
    }

    /// Remove the whole cache directory
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.lock_index()?;
        if self.root.exists() {
            fs::remove_dir_all(&self.root)
                .map_err(|e| cache_failed(format!("Failed to clear cache: {e}")))?;
        }
        *guard = Some(Vec::new());
        Ok(())
    }

    /// Entries sorted by module id, then version
    pub fn list(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = self.with_index(|_, entries| Ok((entries.clone(), false)))?;
        entries.sort_by(|a, b| {
            a.module_id
                .cmp(&b.module_id)
                .then_with(|| a.version.cmp(&b.version))
        });
        Ok(entries)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.with_index(|store, entries| {
            Ok((
                CacheStats::from_entries(entries, store.limits.max_size_bytes),
                false,
            ))
        })
    }

    /// Evict the oldest quarter (rounded up) by `last_accessed`, once
    fn evict_if_needed(&self, entries: &mut Vec<CacheEntry>) -> Result<()> {
        let total: u64 = entries.iter().map(|e| e.size).sum();
        if total <= self.limits.max_size_bytes || entries.is_empty() {
            return Ok(());
        }

        let count = entries.len().div_ceil(4);
        entries.sort_by(|a, b| {
            a.last_accessed
                .cmp(&b.last_accessed)
                .then_with(|| a.module_id.cmp(&b.module_id))
                .then_with(|| a.version.cmp(&b.version))
        });
        let evicted: Vec<CacheEntry> = entries.drain(..count).collect();
        tracing::info!(
            evicted = evicted.len(),
            total_size = total,
            max_size = self.limits.max_size_bytes,
            "cache over ceiling, evicted oldest entries"
        );
        for entry in &evicted {
            self.remove_unreferenced_blob(&entry.content_hash, entries)?;
        }
        Ok(())
    }

    /// Run `f` against the index; `f` returns whether the index changed
    fn with_index<T>(
        &self,
        f: impl FnOnce(&Self, &mut Vec<CacheEntry>) -> Result<(T, bool)>,
    ) -> Result<T> {
        let mut guard = self.lock_index()?;
        if guard.is_none() {
            *guard = Some(index::read_index(&self.root)?);
        }
        let entries = guard.get_or_insert_with(Vec::new);
        let (value, dirty) = f(self, entries)?;
        if dirty {
            index::write_index(&self.root, entries)?;
        }
        Ok(value)
    }

    fn lock_index(&self) -> Result<std::sync::MutexGuard<'_, Option<Vec<CacheEntry>>>> {
        self.index
            .lock()
            .map_err(|_| cache_failed("Cache index lock poisoned"))
    }

    fn blob_path(&self, content_hash: &str) -> PathBuf {
        self.root.join(BLOBS_DIR).join(hash::blob_name(content_hash))
    }

    fn write_blob(&self, content_hash: &str, content: &[u8]) -> Result<()> {
        let path = self.blob_path(content_hash);
        if path.exists() {
            return Ok(());
        }
        let dir = self.root.join(BLOBS_DIR);
        fs::create_dir_all(&dir)
            .map_err(|e| cache_failed(format!("Failed to create blob directory: {e}")))?;
        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| cache_failed(format!("Failed to create temporary blob: {e}")))?;
        temp.write_all(content)
            .map_err(|e| cache_failed(format!("Failed to write blob: {e}")))?;
        temp.persist(&path)
            .map_err(|e| cache_failed(format!("Failed to store blob {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn remove_unreferenced_blob(&self, content_hash: &str, remaining: &[CacheEntry]) -> Result<()> {
        if remaining.iter().any(|e| e.content_hash == content_hash) {
            return Ok(());
        }
        let path = self.blob_path(content_hash);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(cache_failed(format!(
                "Failed to remove blob {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
