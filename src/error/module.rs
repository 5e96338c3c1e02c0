//! Module registry and blueprint loading errors

use super::ArchitechError;

/// Creates a module not found error
pub fn not_found(id: impl Into<String>) -> ArchitechError {
    ArchitechError::ModuleNotFound { id: id.into() }
}

/// Creates a duplicate module error
pub fn duplicate(id: impl Into<String>) -> ArchitechError {
    ArchitechError::DuplicateModule { id: id.into() }
}

/// Creates a blueprint load failure
pub fn load_failed(id: impl Into<String>, reason: impl ToString) -> ArchitechError {
    ArchitechError::ModuleLoadFailed {
        id: id.into(),
        reason: reason.to_string(),
    }
}
