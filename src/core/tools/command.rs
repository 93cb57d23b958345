// src/core/tools/command.rs

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

use super::{CommandOutput, CommandRunner};
use crate::core::error::ProbeError;

/// Spawns real processes through `tokio::process`.
///
/// Children are killed when their future is dropped, so a probe that times out
/// does not leave its tool running.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ProbeError> {
        debug!(program, args = %args.join(" "), "Running external tool.");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    error!(program, "Tool is not installed or not found in PATH.");
                    ProbeError::ToolMissing { tool: program.to_string() }
                }
                _ => {
                    error!(program, error = %e, "Failed to launch tool.");
                    ProbeError::ExecutionFailed(format!("failed to run {program}: {e}"))
                }
            })?;

        debug!(program, status = %output.status, "External tool finished.");
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
