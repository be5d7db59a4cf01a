//! Error types for the AWS CLI adapter.

use thiserror::Error;

use crate::runner::RunnerError;

/// Errors returned by [`super::Ec2Cli`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Ec2CliError {
    /// Raised when configuration is missing required values.
    #[error("missing {field}")]
    InvalidConfig {
        /// Name of the missing or invalid field.
        field: String,
    },
    /// Raised when `aws` returns a non-zero exit status.
    #[error("{program} {action} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Program that failed (typically `aws`).
        program: String,
        /// EC2 subcommand being run (for example `create-image`).
        action: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command.
        stderr: String,
    },
    /// Raised when JSON output from the CLI cannot be parsed.
    #[error("failed to parse {action} output: {message}")]
    Parse {
        /// EC2 subcommand whose output was parsed.
        action: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when a JSON request parameter cannot be serialised.
    #[error("failed to encode {action} parameters: {message}")]
    Encode {
        /// EC2 subcommand the parameters were built for.
        action: String,
        /// Serialiser error message.
        message: String,
    },
    /// Raised when the output parses but does not describe what was asked.
    #[error("unexpected {action} output: {message}")]
    UnexpectedShape {
        /// EC2 subcommand whose output was inspected.
        action: String,
        /// What was missing or wrong.
        message: String,
    },
    /// Raised when command execution fails.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}
