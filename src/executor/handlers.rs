//! Action handlers
//!
//! One handler per action type, looked up by [`ActionKind`]. Handlers stage
//! file changes in the module's [`VirtualFs`] and report what they touched;
//! failures are returned as [`ActionError`] values for the executor to act on.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Action, ActionKind};

use super::ActionError;
use super::command::CommandRunner;
use super::modifiers;
use super::template::TemplateContext;
use super::vfs::VirtualFs;

/// Everything a handler may use while running one action
pub struct ActionContext<'a> {
    pub vfs: &'a mut VirtualFs,
    pub template: &'a TemplateContext,
    pub project_root: &'a Path,
    /// Used when a `run-command` action sets no timeout of its own
    pub command_timeout: Duration,
}

/// What a successful action did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Project-relative paths staged by the action
    pub files_touched: Vec<String>,
    pub warnings: Vec<String>,
}

impl ActionOutcome {
    fn touched(path: impl Into<String>) -> Self {
        Self {
            files_touched: vec![path.into()],
            warnings: Vec::new(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            files_touched: Vec::new(),
            warnings: vec![message.into()],
        }
    }
}

pub trait ActionHandler: Send + Sync {
    fn kind(&self) -> ActionKind;

    fn execute(&self, action: &Action, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, ActionError>;
}

/// Registry of handlers keyed by action type
pub struct HandlerRegistry {
    handlers: BTreeMap<ActionKind, Box<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registry with the built-in handler for every action type
    pub fn with_defaults(runner: Arc<dyn CommandRunner>) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(CreateFileHandler));
        registry.register(Box::new(EnhanceFileHandler));
        registry.register(Box::new(RunCommandHandler { runner }));
        registry.register(Box::new(DeleteFileHandler));
        registry
    }

    /// Register a handler, replacing any handler for the same action type
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn get(&self, kind: ActionKind) -> Option<&dyn ActionHandler> {
        self.handlers.get(&kind).map(|h| h.as_ref())
    }

    pub fn execute(&self, action: &Action, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, ActionError> {
        let handler = self
            .get(action.kind())
            .ok_or(ActionError::NoHandler(action.kind()))?;
        handler.execute(action, ctx)
    }
}

struct CreateFileHandler;

impl ActionHandler for CreateFileHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::CreateFile
    }

    fn execute(&self, action: &Action, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, ActionError> {
        let Action::CreateFile {
            path,
            content,
            overwrite,
        } = action
        else {
            return Err(ActionError::NoHandler(action.kind()));
        };

        let path = ctx.template.render(path)?;
        if !overwrite && ctx.vfs.exists(&path)? {
            return Ok(ActionOutcome::warning(format!(
                "{path} already exists, skipped (set overwrite: true to replace it)"
            )));
        }
        let content = ctx.template.render(content)?;
        ctx.vfs.write(&path, content)?;
        Ok(ActionOutcome::touched(path))
    }
}

struct EnhanceFileHandler;

impl ActionHandler for EnhanceFileHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::EnhanceFile
    }

    fn execute(&self, action: &Action, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, ActionError> {
        let Action::EnhanceFile { path, enhancement } = action else {
            return Err(ActionError::NoHandler(action.kind()));
        };

        let path = ctx.template.render(path)?;
        let enhancement = ctx.template.render_enhancement(enhancement)?;
        let existing = ctx.vfs.read(&path)?;
        let updated = modifiers::apply(&path, &enhancement, existing.as_deref())?;
        if existing.as_deref() == Some(updated.as_str()) {
            tracing::debug!(path = %path, modifier = enhancement.name(), "enhancement made no change");
            return Ok(ActionOutcome::default());
        }
        ctx.vfs.write(&path, updated)?;
        Ok(ActionOutcome::touched(path))
    }
}

struct RunCommandHandler {
    runner: Arc<dyn CommandRunner>,
}

impl ActionHandler for RunCommandHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::RunCommand
    }

    fn execute(&self, action: &Action, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, ActionError> {
        let Action::RunCommand {
            command,
            timeout_secs,
        } = action
        else {
            return Err(ActionError::NoHandler(action.kind()));
        };

        let command = ctx.template.render(command)?;
        let timeout = timeout_secs.map_or(ctx.command_timeout, Duration::from_secs);
        tracing::info!(command = %command, cwd = %ctx.project_root.display(), "running command");

        let output = self.runner.run(&command, ctx.project_root, timeout)?;
        if !output.success() {
            return Err(ActionError::CommandFailed {
                command,
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(ActionOutcome::default())
    }
}

struct DeleteFileHandler;

impl ActionHandler for DeleteFileHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::DeleteFile
    }

    fn execute(&self, action: &Action, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, ActionError> {
        let Action::DeleteFile { path } = action else {
            return Err(ActionError::NoHandler(action.kind()));
        };

        let path = ctx.template.render(path)?;
        if !ctx.vfs.exists(&path)? {
            return Ok(ActionOutcome::warning(format!("{path} does not exist, nothing to delete")));
        }
        ctx.vfs.delete(&path)?;
        Ok(ActionOutcome::touched(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectSpec;
    use crate::domain::{Enhancement, Module, ModuleCategory, ModuleOrigin, ResolvedModule};
    use crate::executor::command::CommandOutput;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records commands and answers with a fixed exit code
    struct FakeRunner {
        exit_code: Option<i32>,
        calls: Mutex<Vec<(String, Duration)>>,
    }

    impl FakeRunner {
        fn exiting(exit_code: Option<i32>) -> Arc<Self> {
            Arc::new(Self {
                exit_code,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &str, _cwd: &Path, timeout: Duration) -> Result<CommandOutput, ActionError> {
            self.calls.lock().unwrap().push((command.to_string(), timeout));
            Ok(CommandOutput {
                exit_code: self.exit_code,
                stdout: String::new(),
                stderr: "boom\n".to_string(),
            })
        }
    }

    fn template() -> TemplateContext {
        let project = ProjectSpec {
            name: "my-app".to_string(),
            path: ".".to_string(),
            framework: "nextjs".to_string(),
            version: "0.1.0".to_string(),
            package_manager: None,
        };
        let module = Module::new("adapter/drizzle", ModuleCategory::Adapter, "1.0.0");
        TemplateContext::new(&project, Path::new("/p"), &ResolvedModule::new(module, ModuleOrigin::Explicit, 100))
    }

    fn run(
        registry: &HandlerRegistry,
        vfs: &mut VirtualFs,
        root: &Path,
        action: &Action,
    ) -> Result<ActionOutcome, ActionError> {
        let template = template();
        let mut ctx = ActionContext {
            vfs,
            template: &template,
            project_root: root,
            command_timeout: Duration::from_secs(300),
        };
        registry.execute(action, &mut ctx)
    }

    #[test]
    fn test_create_renders_and_stages() {
        let temp = TempDir::new().unwrap();
        let registry = HandlerRegistry::with_defaults(FakeRunner::exiting(Some(0)));
        let mut vfs = VirtualFs::new(temp.path(), "adapter/drizzle");
        let action = Action::CreateFile {
            path: "{{project.name}}.txt".to_string(),
            content: "hi {{module.id}}".to_string(),
            overwrite: false,
        };

        let outcome = run(&registry, &mut vfs, temp.path(), &action).unwrap();
        assert_eq!(outcome.files_touched, vec!["my-app.txt"]);
        assert_eq!(vfs.read("my-app.txt").unwrap().as_deref(), Some("hi adapter/drizzle"));
        assert!(!temp.path().join("my-app.txt").exists());
    }

    #[test]
    fn test_create_never_clobbers_without_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "mine").unwrap();
        let registry = HandlerRegistry::with_defaults(FakeRunner::exiting(Some(0)));
        let mut vfs = VirtualFs::new(temp.path(), "adapter/drizzle");

        let skip = Action::CreateFile {
            path: "README.md".to_string(),
            content: "theirs".to_string(),
            overwrite: false,
        };
        let outcome = run(&registry, &mut vfs, temp.path(), &skip).unwrap();
        assert!(outcome.files_touched.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(vfs.read("README.md").unwrap().as_deref(), Some("mine"));

        let replace = Action::CreateFile {
            path: "README.md".to_string(),
            content: "theirs".to_string(),
            overwrite: true,
        };
        run(&registry, &mut vfs, temp.path(), &replace).unwrap();
        assert_eq!(vfs.read("README.md").unwrap().as_deref(), Some("theirs"));
    }

    #[test]
    fn test_enhance_reads_through_overlay() {
        let temp = TempDir::new().unwrap();
        let registry = HandlerRegistry::with_defaults(FakeRunner::exiting(Some(0)));
        let mut vfs = VirtualFs::new(temp.path(), "adapter/drizzle");
        vfs.write("package.json", "{\"name\": \"x\"}").unwrap();

        let action = Action::EnhanceFile {
            path: "package.json".to_string(),
            enhancement: Enhancement::JsonMerge {
                value: serde_json::json!({"scripts": {"db": "drizzle-kit"}}),
                strategy: Default::default(),
            },
        };
        run(&registry, &mut vfs, temp.path(), &action).unwrap();

        let merged: serde_json::Value =
            serde_json::from_str(&vfs.read("package.json").unwrap().unwrap()).unwrap();
        assert_eq!(merged, serde_json::json!({"name": "x", "scripts": {"db": "drizzle-kit"}}));
    }

    #[test]
    fn test_run_command_failure_is_an_error() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::exiting(Some(1));
        let registry = HandlerRegistry::with_defaults(runner.clone());
        let mut vfs = VirtualFs::new(temp.path(), "adapter/drizzle");
        let action = Action::RunCommand {
            command: "npm i {{project.name}}".to_string(),
            timeout_secs: Some(5),
        };

        let err = run(&registry, &mut vfs, temp.path(), &action).unwrap_err();
        assert_eq!(
            err,
            ActionError::CommandFailed {
                command: "npm i my-app".to_string(),
                exit_code: Some(1),
                stderr: "boom".to_string(),
            }
        );
        assert_eq!(
            runner.calls.lock().unwrap().as_slice(),
            &[("npm i my-app".to_string(), Duration::from_secs(5))]
        );
    }

    #[test]
    fn test_delete_stages_removal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("old.css"), "").unwrap();
        let registry = HandlerRegistry::with_defaults(FakeRunner::exiting(Some(0)));
        let mut vfs = VirtualFs::new(temp.path(), "adapter/drizzle");

        let action = Action::DeleteFile {
            path: "old.css".to_string(),
        };
        run(&registry, &mut vfs, temp.path(), &action).unwrap();
        assert!(!vfs.exists("old.css").unwrap());
        assert!(temp.path().join("old.css").exists());

        let again = run(&registry, &mut vfs, temp.path(), &action).unwrap();
        assert_eq!(again.warnings.len(), 1);
    }

    #[test]
    fn test_missing_handler() {
        let temp = TempDir::new().unwrap();
        let registry = HandlerRegistry::empty();
        let mut vfs = VirtualFs::new(temp.path(), "adapter/drizzle");
        let action = Action::DeleteFile {
            path: "x".to_string(),
        };
        assert_eq!(
            run(&registry, &mut vfs, temp.path(), &action).unwrap_err(),
            ActionError::NoHandler(ActionKind::DeleteFile)
        );
    }
}
