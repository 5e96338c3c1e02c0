//! Domain models for Architech
//!
//! This module contains pure domain objects representing core business entities.
//! These types are free of I/O and carry the invariants the engine relies on.

pub mod blueprint;
pub mod conflict;
pub mod module;
pub mod plan;
pub mod resolved;

pub use blueprint::{Action, ActionKind, Blueprint, Enhancement, MergeStrategy};
pub use conflict::{Conflict, ConflictKind, Severity};
pub use module::{CapabilityRequirement, Module, ModuleCategory};
pub use plan::{ExecutionBatch, ExecutionPlan};
pub use resolved::{ModuleOrigin, ResolvedModule};
