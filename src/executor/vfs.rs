//! Per-module virtual file system
//!
//! Every module executes against its own overlay on top of the project
//! directory. Reads see staged content first, then the disk. Nothing touches
//! the disk until [`VirtualFs::flush`]; dropping the overlay discards it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut vfs = VirtualFs::new(&project_root, "adapter/drizzle");
//! vfs.write("drizzle.config.ts", content)?;
//!
//! // On success:
//! let written = vfs.flush(&gate)?;
//!
//! // On error: drop `vfs`, the disk is untouched
//! ```
//!
//! Flushing writes each file to a sibling temporary file and renames it into
//! place, so an individual file is never half-written. A flush that fails part
//! way reports the paths that were already committed.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use crate::domain::blueprint::validate_relative_path;

use super::ActionError;

/// Staged state of one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Pending(String),
    Deleted,
}

/// A flush that failed after it may have written some files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushError {
    pub module: String,
    pub path: PathBuf,
    pub reason: String,
    /// Absolute paths committed before the failure
    pub written: Vec<PathBuf>,
}

/// Serialises flushes of modules running in the same batch
#[derive(Debug, Default)]
pub struct FlushGate(Mutex<()>);

impl FlushGate {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Staged overlay for one module's execution
#[derive(Debug)]
pub struct VirtualFs {
    root: PathBuf,
    module: String,
    overlay: BTreeMap<PathBuf, Overlay>,
}

impl VirtualFs {
    pub fn new(root: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            module: module.into(),
            overlay: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalised project-relative key for a path
    pub fn key(path: &str) -> Result<PathBuf, ActionError> {
        validate_relative_path(path).map_err(ActionError::InvalidPath)?;
        let mut key = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => key.push(part),
                Component::ParentDir => {
                    key.pop();
                }
                _ => {}
            }
        }
        Ok(key)
    }

    /// Whether the path exists in the overlay, or on disk if not staged
    pub fn exists(&self, path: &str) -> Result<bool, ActionError> {
        let key = Self::key(path)?;
        Ok(match self.overlay.get(&key) {
            Some(Overlay::Pending(_)) => true,
            Some(Overlay::Deleted) => false,
            None => self.root.join(&key).is_file(),
        })
    }

    /// Read through the overlay; `None` when the file does not exist
    pub fn read(&self, path: &str) -> Result<Option<String>, ActionError> {
        let key = Self::key(path)?;
        match self.overlay.get(&key) {
            Some(Overlay::Pending(content)) => Ok(Some(content.clone())),
            Some(Overlay::Deleted) => Ok(None),
            None => match fs::read_to_string(self.root.join(&key)) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(ActionError::io(path, e)),
            },
        }
    }

    pub fn write(&mut self, path: &str, content: impl Into<String>) -> Result<(), ActionError> {
        let key = Self::key(path)?;
        self.overlay.insert(key, Overlay::Pending(content.into()));
        Ok(())
    }

    pub fn delete(&mut self, path: &str) -> Result<(), ActionError> {
        let key = Self::key(path)?;
        self.overlay.insert(key, Overlay::Deleted);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }

    /// Commit the overlay to disk, holding the gate for the whole flush
    pub fn flush(self, gate: &FlushGate) -> Result<Vec<PathBuf>, FlushError> {
        let _guard = gate.0.lock().map_err(|_| FlushError {
            module: self.module.clone(),
            path: self.root.clone(),
            reason: "flush lock poisoned".to_string(),
            written: Vec::new(),
        })?;

        let mut written = Vec::with_capacity(self.overlay.len());
        for (key, entry) in &self.overlay {
            let target = self.root.join(key);
            let result = match entry {
                Overlay::Pending(content) => write_atomic(&target, content.as_bytes()),
                Overlay::Deleted => match fs::remove_file(&target) {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.to_string()),
                    _ => Ok(()),
                },
            };
            if let Err(reason) = result {
                return Err(FlushError {
                    module: self.module.clone(),
                    path: target,
                    reason,
                    written,
                });
            }
            written.push(target);
        }

        tracing::debug!(module = %self.module, files = written.len(), "module flushed");
        Ok(written)
    }
}

fn write_atomic(target: &Path, content: &[u8]) -> Result<(), String> {
    let parent = target
        .parent()
        .ok_or_else(|| format!("{} has no parent directory", target.display()))?;
    fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| e.to_string())?;
    temp.write_all(content).map_err(|e| e.to_string())?;
    temp.persist(target).map_err(|e| e.error.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_normalises() {
        assert_eq!(VirtualFs::key("./src/../lib/a.ts").unwrap(), PathBuf::from("lib/a.ts"));
        assert!(matches!(VirtualFs::key("../a"), Err(ActionError::InvalidPath(_))));
    }

    #[test]
    fn test_read_through_overlay() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        let mut vfs = VirtualFs::new(temp.path(), "adapter/x");

        assert_eq!(vfs.read("package.json").unwrap().as_deref(), Some("{}"));
        assert_eq!(vfs.read("missing.txt").unwrap(), None);

        vfs.write("./package.json", "{\"a\":1}").unwrap();
        assert_eq!(vfs.read("package.json").unwrap().as_deref(), Some("{\"a\":1}"));
        // Disk untouched until flush
        assert_eq!(fs::read_to_string(temp.path().join("package.json")).unwrap(), "{}");

        vfs.delete("package.json").unwrap();
        assert!(!vfs.exists("package.json").unwrap());
        assert_eq!(vfs.read("package.json").unwrap(), None);
    }

    #[test]
    fn test_flush_writes_and_deletes() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "old").unwrap();
        let mut vfs = VirtualFs::new(temp.path(), "framework/nextjs");
        vfs.write("src/app/page.tsx", "export default 1").unwrap();
        vfs.delete("README.md").unwrap();

        let written = vfs.flush(&FlushGate::new()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("src/app/page.tsx")).unwrap(),
            "export default 1"
        );
        assert!(!temp.path().join("README.md").exists());
    }

    #[test]
    fn test_dropped_overlay_leaves_disk_untouched() {
        let temp = TempDir::new().unwrap();
        {
            let mut vfs = VirtualFs::new(temp.path(), "adapter/x");
            vfs.write("a.txt", "a").unwrap();
        }
        assert!(!temp.path().join("a.txt").exists());
    }

    #[test]
    fn test_flush_failure_reports_written_paths() {
        let temp = TempDir::new().unwrap();
        // A regular file where a directory is needed makes the second write fail
        fs::write(temp.path().join("blocker"), "").unwrap();
        let mut vfs = VirtualFs::new(temp.path(), "adapter/x");
        vfs.write("a.txt", "a").unwrap();
        vfs.write("blocker/b.txt", "b").unwrap();

        let err = vfs.flush(&FlushGate::new()).unwrap_err();
        assert_eq!(err.module, "adapter/x");
        assert_eq!(err.path, temp.path().join("blocker/b.txt"));
        assert_eq!(err.written, vec![temp.path().join("a.txt")]);
    }
}
