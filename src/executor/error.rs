//! Action errors
//!
//! Handlers return these as values; the executor decides what a failure means
//! for the module (discard its staged files) and lifts it into
//! [`crate::error::ArchitechError`] for the caller.

use thiserror::Error;

use crate::domain::ActionKind;

/// Why a single blueprint action failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("command `{command}` exited with {}: {stderr}", .exit_code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("command `{command}` timed out after {timeout_secs}s")]
    CommandTimedOut { command: String, timeout_secs: u64 },

    #[error("{modifier} on {path}: {reason}")]
    ModifierFailed {
        path: String,
        modifier: String,
        reason: String,
    },

    #[error("template: {0}")]
    Template(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("{path}: {reason}")]
    Io { path: String, reason: String },

    #[error("no handler registered for {0} actions")]
    NoHandler(ActionKind),
}

impl ActionError {
    pub fn modifier(path: impl Into<String>, modifier: impl Into<String>, reason: impl Into<String>) -> Self {
        ActionError::ModifierFailed {
            path: path.into(),
            modifier: modifier.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<String>, reason: impl ToString) -> Self {
        ActionError::Io {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
