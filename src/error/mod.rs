//! Error types and handling for Architech
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`validation`]: Genome validation errors
//! - [`resolution`]: Capability and dependency resolution errors
//! - [`graph`]: Dependency graph and planning errors
//! - [`module`]: Module registry and blueprint loading errors
//! - [`execution`]: Action, flush and command errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors
//! - [`cache`]: Cache errors
//!
//! Execution-time errors abort the run. Modules committed by earlier batches stay on
//! disk: there is no rollback across modules.

pub mod cache;
pub mod config;
pub mod execution;
pub mod fs;
pub mod graph;
pub mod module;
pub mod resolution;
pub mod validation;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Architech operations
#[derive(Error, Diagnostic, Debug)]
pub enum ArchitechError {
    // Genome errors
    #[error("Genome validation failed: {}", .messages.join("; "))]
    #[diagnostic(
        code(architech::genome::invalid),
        help("Fix the listed fields in the genome file and run again")
    )]
    ValidationFailed { messages: Vec<String> },

    // Resolution errors
    #[error("Module resolution failed with {count} conflict(s):\n{details}")]
    #[diagnostic(
        code(architech::resolution::conflicts),
        help("Apply one of the suggestions listed for each conflict")
    )]
    ResolutionFailed { count: usize, details: String },

    // Graph errors
    #[error("Circular dependency detected: {chain}")]
    #[diagnostic(
        code(architech::graph::circular),
        help("Remove one of the dependencies in the cycle from the module manifests")
    )]
    CircularDependency { chain: String },

    #[error("Module '{dependent}' depends on '{dependency}', which runs in a later phase")]
    #[diagnostic(
        code(architech::graph::phase_order),
        help("Modules may only depend on modules of the same or an earlier phase: framework, adapter, integration, feature")
    )]
    PhaseOrderViolation {
        dependency: String,
        dependent: String,
    },

    #[error("No framework module in the resolved module set")]
    #[diagnostic(
        code(architech::graph::missing_framework),
        help("Add a framework module (e.g. framework/nextjs) to the genome")
    )]
    MissingFramework,

    // Module errors
    #[error("Module not found: {id}")]
    #[diagnostic(
        code(architech::module::not_found),
        help("Run 'architech modules' to list the available modules")
    )]
    ModuleNotFound { id: String },

    #[error("Module '{id}' is defined more than once")]
    #[diagnostic(code(architech::module::duplicate))]
    DuplicateModule { id: String },

    #[error("Failed to load blueprint for module '{id}': {reason}")]
    #[diagnostic(code(architech::module::load_failed))]
    ModuleLoadFailed { id: String, reason: String },

    // Execution errors
    #[error("Action #{index} of module '{module}' failed: {reason}")]
    #[diagnostic(code(architech::execution::action_failed))]
    ActionFailed {
        module: String,
        index: usize,
        reason: String,
    },

    #[error("Command `{command}` in module '{module}' exited with {status}: {stderr}")]
    #[diagnostic(
        code(architech::execution::command_failed),
        help("Run the command manually in the project directory to inspect the failure")
    )]
    CommandFailed {
        module: String,
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Command `{command}` in module '{module}' timed out after {timeout_secs}s")]
    #[diagnostic(
        code(architech::execution::command_timed_out),
        help("Raise command_timeout_secs in the engine configuration")
    )]
    CommandTimedOut {
        module: String,
        command: String,
        timeout_secs: u64,
    },

    #[error("Modifier '{modifier}' failed on '{path}' in module '{module}': {reason}")]
    #[diagnostic(code(architech::execution::modifier_failed))]
    ModifierFailed {
        module: String,
        path: String,
        modifier: String,
        reason: String,
    },

    #[error(
        "Failed to commit module '{module}' at '{path}': {reason} (written before failure: [{}])",
        .written.join(", ")
    )]
    #[diagnostic(
        code(architech::execution::flush_failed),
        help("The module was partially written; inspect the listed paths before re-running")
    )]
    FlushFailed {
        module: String,
        path: String,
        reason: String,
        written: Vec<String>,
    },

    #[error("Dependency installation failed: {command}: {reason}")]
    #[diagnostic(
        code(architech::execution::install_failed),
        help("Run the package manager manually in the project directory, or pass --no-install")
    )]
    InstallFailed { command: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(architech::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(architech::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(architech::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(architech::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(architech::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(architech::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(architech::fs::io_error))]
    IoError { message: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(architech::cache::operation_failed))]
    CacheOperationFailed { message: String },
}

impl From<std::io::Error> for ArchitechError {
    fn from(err: std::io::Error) -> Self {
        ArchitechError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ArchitechError {
    fn from(err: serde_yaml::Error) -> Self {
        ArchitechError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ArchitechError {
    fn from(err: serde_json::Error) -> Self {
        ArchitechError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ArchitechError>;
