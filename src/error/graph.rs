//! Dependency graph and planning errors

use super::ArchitechError;

/// Creates a circular dependency error from the ids forming the cycle
///
/// The first id is repeated at the end so the chain reads as a loop.
pub fn circular(cycle: &[String]) -> ArchitechError {
    let mut chain: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = cycle.first() {
        chain.push(first);
    }
    ArchitechError::CircularDependency {
        chain: chain.join(" -> "),
    }
}

/// Creates a phase order violation error
pub fn phase_order(dependency: impl Into<String>, dependent: impl Into<String>) -> ArchitechError {
    ArchitechError::PhaseOrderViolation {
        dependency: dependency.into(),
        dependent: dependent.into(),
    }
}
