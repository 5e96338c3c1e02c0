//! Configuration file handling for Architech
//!
//! This module contains data structures for:
//! - The genome - the declarative project description
//! - `config.yaml` - Engine settings (cache, timeouts, parallelism)

pub mod engine;
pub mod genome;

pub use engine::EngineConfig;
pub use genome::{Genome, GenomeModule, ProjectSpec};
