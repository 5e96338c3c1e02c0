//! Capability and dependency resolution errors

use super::ArchitechError;
use crate::domain::Conflict;

/// Aggregates every error-severity conflict into a single resolution failure
///
/// Each conflict is rendered on its own line with its suggestions.
pub fn failed(conflicts: &[&Conflict]) -> ArchitechError {
    let details = conflicts
        .iter()
        .map(|conflict| format!("  - {}", conflict.describe()))
        .collect::<Vec<_>>()
        .join("\n");
    ArchitechError::ResolutionFailed {
        count: conflicts.len(),
        details,
    }
}
