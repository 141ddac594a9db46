//! Hands the confirmed command to the host shell.
//!
//! The command string is passed verbatim to `sh -c` with inherited stdio.
//! Nothing is sandboxed or sanitized here: execution is always an explicit,
//! user-confirmed action, and the danger warning has already been shown.

use anyhow::Result;
use std::process::{Command, ExitStatus};
use tracing::{info, warn};

/// Trait for running a command line in a shell.
///
/// This abstraction enables testing the loop without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    fn run_shell(&self, command: &str) -> Result<ExitStatus>;
}

/// Default runner using the system shell.
pub struct SystemShellRunner;

impl ProcessRunner for SystemShellRunner {
    fn run_shell(&self, command: &str) -> Result<ExitStatus> {
        let status = Command::new("sh").arg("-c").arg(command).status()?;
        Ok(status)
    }
}

/// Executes the user-confirmed command and reports its status.
pub struct ShellExecutor {
    runner: Box<dyn ProcessRunner>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemShellRunner))
    }

    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Runs the command in the shell.
    ///
    /// A non-zero command status is logged but is not an error: the
    /// invocation ends after execution regardless of how the command fared.
    /// Only a failure to spawn the shell itself is reported.
    pub fn run(&self, command: &str) -> Result<()> {
        info!("Executing shell command: {}", command);
        let status = self.runner.run_shell(command)?;
        if !status.success() {
            warn!("Command exited with status: {}", status);
        }
        Ok(())
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}
