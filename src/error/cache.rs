//! Cache errors

use super::ArchitechError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> ArchitechError {
    ArchitechError::CacheOperationFailed {
        message: message.into(),
    }
}
