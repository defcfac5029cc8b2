//! Error types for provider registration and lookup execution.

use std::time::Duration;

use thiserror::Error;

/// Configuration errors raised while building the provider registry.
///
/// Callers are expected to abort startup on these; a provider is never
/// dropped silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("lookup provider with name {name:?} already registered")]
    DuplicateName { name: String },
    #[error("lookup provider with flag name {flag:?} already registered (by {existing:?})")]
    DuplicateFlag { flag: String, existing: String },
}

/// Failure of a single lookup.
///
/// Execution failures keep the output captured before the failure so callers
/// can display it next to the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("command not found: {command}")]
    CommandNotFound { command: String },
    #[error("command '{command_line}' failed: {reason}{}", stderr_suffix(.stderr))]
    Failed {
        command_line: String,
        reason: String,
        stderr: String,
        output: String,
    },
    #[error("{provider} timed out after {}s", .after.as_secs())]
    TimedOut { provider: String, after: Duration },
}

impl LookupError {
    /// Output captured alongside the failure, empty when nothing was captured.
    pub fn output(&self) -> &str {
        match self {
            LookupError::Failed { output, .. } => output,
            LookupError::CommandNotFound { .. } | LookupError::TimedOut { .. } => "",
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\nSTDERR was:\n{stderr}")
    }
}

/// Reasons the watch state machine refuses a transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("Watch mode is not available for {provider}")]
    NotWatchable { provider: String },
    #[error("watch mode requires a finished lookup")]
    NoActiveResult,
    #[error("Enter a positive number of seconds")]
    InvalidInterval { input: String },
}
