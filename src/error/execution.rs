//! Action, flush and dependency installation errors

use super::ArchitechError;
use crate::executor::ActionError;
use crate::executor::vfs::FlushError;

/// Creates an action failure for a module
pub fn action_failed(module: impl Into<String>, index: usize, reason: impl ToString) -> ArchitechError {
    ArchitechError::ActionFailed {
        module: module.into(),
        index,
        reason: reason.to_string(),
    }
}

/// Creates a dependency installation failure
pub fn install_failed(command: impl Into<String>, reason: impl ToString) -> ArchitechError {
    ArchitechError::InstallFailed {
        command: command.into(),
        reason: reason.to_string(),
    }
}

/// Lifts an action error into the engine error for the module that raised it
pub fn from_action(module: impl Into<String>, index: usize, err: ActionError) -> ArchitechError {
    let module = module.into();
    match err {
        ActionError::CommandFailed {
            command,
            exit_code,
            stderr,
        } => ArchitechError::CommandFailed {
            module,
            command,
            status: exit_code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")),
            stderr,
        },
        ActionError::CommandTimedOut {
            command,
            timeout_secs,
        } => ArchitechError::CommandTimedOut {
            module,
            command,
            timeout_secs,
        },
        ActionError::ModifierFailed {
            path,
            modifier,
            reason,
        } => ArchitechError::ModifierFailed {
            module,
            path,
            modifier,
            reason,
        },
        other => action_failed(module, index, other),
    }
}

impl From<FlushError> for ArchitechError {
    fn from(err: FlushError) -> Self {
        ArchitechError::FlushFailed {
            module: err.module,
            path: err.path.display().to_string(),
            reason: err.reason,
            written: err
                .written
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}
