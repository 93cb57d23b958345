// src/core/probes/stress.rs

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::Probe;
use crate::config::StressConfig;
use crate::core::error::ProbeError;
use crate::core::models::{ProbeName, ProbePayload, ProbeRequest};
use crate::core::parser::throughput::parse_throughput;
use crate::core::tools::CommandRunner;

/// Resolved parameters of a throughput stress run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressParams {
    pub server: String,
    pub duration_secs: u64,
    pub parallel_streams: u32,
    pub udp: bool,
    pub bandwidth: String,
}

impl StressParams {
    /// Request overrides win over configured defaults.
    pub fn resolve(request: &ProbeRequest, defaults: &StressConfig) -> Self {
        Self {
            server: request.target.clone().unwrap_or_else(|| defaults.server.clone()),
            duration_secs: request.stress_duration_secs.unwrap_or(defaults.duration_secs),
            parallel_streams: request.parallel_streams.unwrap_or(defaults.parallel_streams),
            udp: request.udp.unwrap_or(defaults.udp),
            bandwidth: request.stress_bandwidth.clone().unwrap_or_else(|| defaults.bandwidth.clone()),
        }
    }

    /// `-c <server> -t <secs> -P <streams>`, plus `-u -b <bandwidth>` in UDP mode.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c".to_string(),
            self.server.clone(),
            "-t".to_string(),
            self.duration_secs.to_string(),
            "-P".to_string(),
            self.parallel_streams.to_string(),
        ];
        if self.udp {
            args.extend(["-u".to_string(), "-b".to_string(), self.bandwidth.clone()]);
        }
        args
    }
}

pub struct StressProbe {
    commands: Arc<dyn CommandRunner>,
    program: String,
    params: StressParams,
}

impl StressProbe {
    pub fn new(commands: Arc<dyn CommandRunner>, program: String, params: StressParams) -> Self {
        Self { commands, program, params }
    }
}

#[async_trait]
impl Probe for StressProbe {
    fn name(&self) -> ProbeName {
        ProbeName::StressTest
    }

    async fn run(&self) -> Result<ProbePayload, ProbeError> {
        info!(
            server = %self.params.server,
            streams = self.params.parallel_streams,
            udp = self.params.udp,
            "Starting maximum network stress test."
        );
        let stdout = self
            .commands
            .run(&self.program, &self.params.to_args())
            .await?
            .into_stdout(&self.program)?;
        let record = parse_throughput(&stdout).into_record();
        info!(intervals = record.test_results.len(), "Completed maximum network stress test.");
        Ok(ProbePayload::Throughput(record))
    }
}
