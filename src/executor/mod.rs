//! Blueprint execution
//!
//! For each module in plan order the executor:
//!
//! 1. Loads the module's blueprint (cache-first, via [`ModuleLoader`])
//! 2. Creates a fresh [`VirtualFs`] rooted at the project directory
//! 3. Runs the actions strictly in declared order through the
//!    [`HandlerRegistry`]
//! 4. Flushes the VFS if every action succeeded, or drops it otherwise
//!
//! A module is the unit of atomicity. Modules committed earlier are never
//! undone when a later module fails.

pub mod command;
pub mod error;
pub mod handlers;
pub mod modifiers;
pub mod template;
pub mod vfs;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use command::{CommandRunner, ShellCommandRunner};
pub use error::ActionError;
pub use handlers::{ActionContext, ActionHandler, ActionOutcome, HandlerRegistry};
pub use template::TemplateContext;
pub use vfs::{FlushGate, VirtualFs};

use crate::config::ProjectSpec;
use crate::domain::ResolvedModule;
use crate::error::{Result, execution::from_action};
use crate::loader::ModuleLoader;

/// What a committed module did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleReport {
    pub module_id: String,
    /// Absolute paths written or removed by the flush
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Where and for which project modules are executed
#[derive(Debug, Clone, Copy)]
pub struct ExecutionTarget<'a> {
    pub project: &'a ProjectSpec,
    pub root: &'a Path,
}

/// Runs blueprints module by module
pub struct BlueprintExecutor {
    loader: ModuleLoader,
    handlers: HandlerRegistry,
    command_timeout: Duration,
}

impl BlueprintExecutor {
    pub fn new(loader: ModuleLoader, handlers: HandlerRegistry, command_timeout: Duration) -> Self {
        Self {
            loader,
            handlers,
            command_timeout,
        }
    }

    /// Executor with the built-in handlers and a real shell
    pub fn with_defaults(loader: ModuleLoader, command_timeout: Duration) -> Self {
        Self::new(
            loader,
            HandlerRegistry::with_defaults(Arc::new(ShellCommandRunner)),
            command_timeout,
        )
    }

    /// Execute one module as a transaction
    ///
    /// On any action failure the staged changes are discarded and the error
    /// is returned; nothing of this module reaches the disk.
    pub fn execute_module(
        &self,
        module: &ResolvedModule,
        target: ExecutionTarget<'_>,
        gate: &FlushGate,
    ) -> Result<ModuleReport> {
        let blueprint = self.loader.load(&module.module)?;
        let template = TemplateContext::new(target.project, target.root, module);
        let mut vfs = VirtualFs::new(target.root, module.id());
        let mut warnings = Vec::new();

        for (index, action) in blueprint.actions.iter().enumerate() {
            tracing::debug!(module = %module.id(), index, action = %action.describe(), "running action");
            let mut ctx = ActionContext {
                vfs: &mut vfs,
                template: &template,
                project_root: target.root,
                command_timeout: self.command_timeout,
            };
            match self.handlers.execute(action, &mut ctx) {
                Ok(outcome) => {
                    for warning in outcome.warnings {
                        tracing::warn!(module = %module.id(), %warning, "action warning");
                        warnings.push(format!("{}: {warning}", module.id()));
                    }
                }
                Err(err) => {
                    tracing::error!(
                        module = %module.id(),
                        index,
                        action = %action.describe(),
                        error = %err,
                        "action failed, discarding staged changes"
                    );
                    return Err(from_action(module.id(), index, err));
                }
            }
        }

        let files = vfs.flush(gate)?;
        tracing::info!(module = %module.id(), files = files.len(), "module committed");
        Ok(ModuleReport {
            module_id: module.id().to_string(),
            files,
            warnings,
        })
    }
}
