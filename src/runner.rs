//! Subprocess seam for adapters that drive a provider CLI.
//!
//! Adapters never call [`std::process::Command`] directly; they hand the
//! program and argument vector to a [`CommandRunner`], which lets tests
//! substitute scripted answers for the real `aws` binary.

use std::ffi::OsString;
use std::process::Command;

use thiserror::Error;

/// Exit status and captured streams of one finished CLI invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Everything the process wrote to stdout, lossily decoded.
    pub stdout: String,
    /// Everything the process wrote to stderr, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the invocation exited with code zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Exit code rendered for error messages, `unknown` for signal deaths.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.code
            .map_or_else(|| String::from("unknown"), |code| code.to_string())
    }

    /// Stderr without surrounding whitespace, as quoted in error reports.
    #[must_use]
    pub fn stderr_summary(&self) -> &str {
        self.stderr.trim()
    }
}

/// Failure to start a CLI process. A process that starts and exits non-zero
/// is reported through [`CommandOutput`] instead.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RunnerError {
    /// The binary could not be launched (missing, not executable, ...).
    #[error("could not launch {program}: {message}")]
    Spawn {
        /// Binary that was requested.
        program: String,
        /// Reason reported by the operating system.
        message: String,
    },
}

/// Executes one CLI invocation to completion.
pub trait CommandRunner {
    /// Runs `program` with `args` and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Spawn`] when the process cannot be launched.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RunnerError>;
}

/// Runner backed by real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, RunnerError> {
        let finished = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| RunnerError::Spawn {
                program: program.to_owned(),
                message: err.to_string(),
            })?;

        Ok(CommandOutput {
            code: finished.status.code(),
            stdout: String::from_utf8_lossy(&finished.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&finished.stderr).into_owned(),
        })
    }
}
