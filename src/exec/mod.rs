//! Subprocess boundary for `$(...)` substitution.

/// Runs commands through the platform shell with a deadline.
pub mod shell;

pub use shell::SystemShell;

use std::path::Path;
use std::time::Duration;

/// Result of a command that was launched and ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit status, or `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output, undecorated.
    pub stdout: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The process could not be started at all.
    #[error("failed to launch: {0}")]
    Launch(#[source] std::io::Error),
    /// The process did not finish in time and was killed.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The process started but waiting on it or reading its output failed.
    #[error("failed to wait: {0}")]
    Wait(#[source] std::io::Error),
}

/// Trait for anything able to run a substitution command.
///
/// A nonzero exit is a successful run: implementations return `Ok` with the
/// exit code and leave the judgement to the caller.
pub trait ShellExecutor: Send + Sync {
    fn run(&self, timeout: Duration, cwd: &Path, command: &str)
    -> Result<ShellOutput, ExecError>;
}
