//! Genome validation errors

use super::ArchitechError;

/// Aggregates every validation message into one error
pub fn failed(messages: Vec<String>) -> ArchitechError {
    ArchitechError::ValidationFailed { messages }
}
