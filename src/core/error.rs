// src/core/error.rs

use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong inside a single probe.
///
/// None of these escape the orchestrator: each one is turned into a
/// [`crate::core::models::ProbeFailure`] for the probe that raised it.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The external executable is not installed or not on `PATH`.
    #[error("tool not found")]
    ToolMissing { tool: String },

    /// The executable ran but failed, or could not be launched for another reason.
    #[error("{0}")]
    ExecutionFailed(String),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("interface query failed: {0}")]
    Interfaces(String),

    #[error("bandwidth test failed: {0}")]
    Bandwidth(String),

    /// The task running the probe panicked or was cancelled.
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Bandwidth(err.to_string())
    }
}
