//! File system errors

use std::path::Path;

use super::ArchitechError;

/// Creates a file not found error
pub fn not_found(path: &Path) -> ArchitechError {
    ArchitechError::FileNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a file read failed error
pub fn read_failed(path: &Path, reason: impl ToString) -> ArchitechError {
    ArchitechError::FileReadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: &Path, reason: impl ToString) -> ArchitechError {
    ArchitechError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
