//! Shell command execution for `run-command` actions
//!
//! Commands run through the platform shell in the real project directory.
//! Output is drained on reader threads so a chatty child cannot block on a
//! full pipe while the runner polls for exit. The timeout covers both the
//! exit and the pipes closing: a backgrounded grandchild that keeps stdout
//! open counts as a hang. On timeout the child is killed.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::ActionError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs shell commands for blueprints
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `cwd`, killing it after `timeout`
    fn run(&self, command: &str, cwd: &Path, timeout: Duration) -> Result<CommandOutput, ActionError>;
}

/// Runs commands with `sh -c` (`cmd /C` on Windows)
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, command: &str, cwd: &Path, timeout: Duration) -> Result<CommandOutput, ActionError> {
        let mut child = shell(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ActionError::CommandFailed {
                command: command.to_string(),
                exit_code: None,
                stderr: format!("failed to spawn: {e}"),
            })?;

        let deadline = Instant::now() + timeout;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_until(&mut child, deadline).map_err(|e| ActionError::CommandFailed {
            command: command.to_string(),
            exit_code: None,
            stderr: format!("wait error: {e}"),
        })?;

        let output = status.and_then(|status| {
            Some(CommandOutput {
                exit_code: status.code(),
                stdout: collect(&stdout, deadline)?,
                stderr: collect(&stderr, deadline)?,
            })
        });

        output.ok_or_else(|| {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(command, timeout_secs = timeout.as_secs(), "command timed out");
            ActionError::CommandTimedOut {
                command: command.to_string(),
                timeout_secs: timeout.as_secs(),
            }
        })
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// `None` when the pipe is still open at `deadline`
fn collect(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

/// `Ok(None)` when the deadline passed first
fn wait_until(
    child: &mut Child,
    deadline: Instant,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
