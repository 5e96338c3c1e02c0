//! High-level operations
//!
//! - [`generate`]: the genome-to-project pipeline behind `architech new`,
//!   whose preparation steps also back `plan` and `validate`
//!
//! Operations coordinate the registry, the resolver, the blueprint executor
//! and the dependency installer, and report progress through an injected
//! [`crate::observer::PipelineObserver`].

pub mod generate;
