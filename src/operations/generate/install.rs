//! Dependency installation after every module has committed

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, execution::install_failed};
use crate::executor::{ActionError, CommandRunner};

/// Installs the generated project's package dependencies
pub trait DependencyInstaller: Send + Sync {
    fn install(&self, package_manager: &str, root: &Path) -> Result<()>;
}

/// Runs `<package manager> install` in the project root
pub struct PackageManagerInstaller {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl PackageManagerInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl DependencyInstaller for PackageManagerInstaller {
    fn install(&self, package_manager: &str, root: &Path) -> Result<()> {
        let command = format!("{package_manager} install");
        tracing::info!(command = %command, root = %root.display(), "installing dependencies");
        let output = self
            .runner
            .run(&command, root, self.timeout)
            .map_err(|e| match e {
                ActionError::CommandTimedOut { timeout_secs, .. } => {
                    install_failed(&command, format!("timed out after {timeout_secs}s"))
                }
                other => install_failed(&command, other),
            })?;
        if !output.success() {
            return Err(install_failed(&command, output.stderr.trim()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchitechError;
    use crate::executor::command::CommandOutput;

    struct Exit(Option<i32>);

    impl CommandRunner for Exit {
        fn run(&self, _command: &str, _cwd: &Path, _timeout: Duration) -> std::result::Result<CommandOutput, ActionError> {
            Ok(CommandOutput {
                exit_code: self.0,
                stdout: String::new(),
                stderr: "ERR! missing peer\n".to_string(),
            })
        }
    }

    #[test]
    fn test_install_failure_carries_stderr() {
        let installer = PackageManagerInstaller::new(Arc::new(Exit(Some(1))), Duration::from_secs(1));
        match installer.install("pnpm", Path::new("/tmp")).unwrap_err() {
            ArchitechError::InstallFailed { command, reason } => {
                assert_eq!(command, "pnpm install");
                assert_eq!(reason, "ERR! missing peer");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_install_success() {
        let installer = PackageManagerInstaller::new(Arc::new(Exit(Some(0))), Duration::from_secs(1));
        assert!(installer.install("npm", Path::new("/tmp")).is_ok());
    }
}
