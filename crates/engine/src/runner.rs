//! External command execution and output normalization.
//!
//! [`CommandRunner`] is the seam between providers and the operating system.
//! [`ProcessCommandRunner`] spawns real processes; tests substitute their own
//! implementations returning canned results.
//!
//! Normalization rules (see [`normalize_output`]):
//! - stdout only: stdout, trimmed
//! - stderr only: `STDERR:\n<stderr>`
//! - both: `STDERR:\n<stderr>\n\nSTDOUT:\n<stdout>` (stderr first)
//! - success with nothing captured: `(No results found)`

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::LookupError;

/// Placeholder output for a successful command that printed nothing.
pub const NO_RESULTS: &str = "(No results found)";

/// Executes an external command and returns its normalized output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `args`.
    ///
    /// On failure the returned error carries the normalized partial output.
    async fn run(&self, command: &str, args: &[String]) -> Result<String, LookupError>;
}

/// Raw result of a finished process before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` on success, otherwise a description of the failure
    /// (exit status or spawn error).
    pub failure: Option<String>,
}

/// Apply the normalization rules to a finished process.
pub fn normalize_output(command: &str, args: &[String], raw: RawProcessOutput) -> Result<String, LookupError> {
    let stdout = raw.stdout.trim();
    let stderr = raw.stderr.trim();

    let combined = match (stderr.is_empty(), stdout.is_empty()) {
        (true, _) => stdout.to_string(),
        (false, true) => format!("STDERR:\n{stderr}"),
        (false, false) => format!("STDERR:\n{stderr}\n\nSTDOUT:\n{stdout}"),
    };

    if let Some(reason) = raw.failure {
        return Err(LookupError::Failed {
            command_line: command_line(command, args),
            reason,
            stderr: stderr.to_string(),
            output: combined,
        });
    }

    if combined.is_empty() {
        return Ok(NO_RESULTS.to_string());
    }
    Ok(combined)
}

fn command_line(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", args.join(" "))
    }
}

/// Runner that spawns real processes through Tokio.
///
/// Children are killed when the future is dropped, so an abandoned or
/// timed-out lookup does not leave a process behind.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, command: &str, args: &[String]) -> Result<String, LookupError> {
        debug!(command = %command, args = ?args, "spawning lookup command");
        let raw = match Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => RawProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                failure: (!output.status.success()).then(|| output.status.to_string()),
            },
            Err(error) => {
                warn!(command = %command, error = %error, "failed to spawn lookup command");
                RawProcessOutput {
                    failure: Some(error.to_string()),
                    ..RawProcessOutput::default()
                }
            }
        };
        normalize_output(command, args, raw)
    }
}
