//! Cache statistics

use super::index::CacheEntry;

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of indexed (module, version) entries
    pub entries: usize,
    /// Number of distinct modules
    pub modules: usize,
    /// Total size of indexed content in bytes
    pub total_size: u64,
    /// Configured ceiling in bytes
    pub max_size: u64,
}

impl CacheStats {
    pub fn from_entries(entries: &[CacheEntry], max_size: u64) -> Self {
        let mut modules: Vec<&str> = entries.iter().map(|e| e.module_id.as_str()).collect();
        modules.sort_unstable();
        modules.dedup();
        Self {
            entries: entries.len(),
            modules: modules.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            max_size,
        }
    }

    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        format_size(self.total_size)
    }

    /// Share of the ceiling in use, in percent
    pub fn usage_percent(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }
        self.total_size as f64 * 100.0 / self.max_size as f64
    }
}

/// Format a byte count as a human-readable string
pub fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{bytes} B")
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}
