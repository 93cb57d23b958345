// src/core/probes/packet_loss.rs

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::Probe;
use crate::config::PacketLossConfig;
use crate::core::error::ProbeError;
use crate::core::models::{ProbeName, ProbePayload, ProbeRequest};
use crate::core::parser::packet_loss::parse_packet_loss;
use crate::core::tools::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketLossParams {
    pub server: String,
    pub duration_secs: u64,
    pub bandwidth: String,
}

impl PacketLossParams {
    pub fn resolve(request: &ProbeRequest, defaults: &PacketLossConfig) -> Self {
        Self {
            server: request.target.clone().unwrap_or_else(|| defaults.server.clone()),
            duration_secs: request.packet_loss_duration_secs.unwrap_or(defaults.duration_secs),
            bandwidth: request
                .packet_loss_bandwidth
                .clone()
                .unwrap_or_else(|| defaults.bandwidth.clone()),
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            self.server.clone(),
            "-u".to_string(),
            "-t".to_string(),
            self.duration_secs.to_string(),
            "-b".to_string(),
            self.bandwidth.clone(),
        ]
    }
}

/// A UDP throughput run read for datagram loss only.
pub struct PacketLossProbe {
    commands: Arc<dyn CommandRunner>,
    program: String,
    params: PacketLossParams,
}

impl PacketLossProbe {
    pub fn new(commands: Arc<dyn CommandRunner>, program: String, params: PacketLossParams) -> Self {
        Self { commands, program, params }
    }
}

#[async_trait]
impl Probe for PacketLossProbe {
    fn name(&self) -> ProbeName {
        ProbeName::PacketLoss
    }

    async fn run(&self) -> Result<ProbePayload, ProbeError> {
        info!(server = %self.params.server, bandwidth = %self.params.bandwidth, "Starting packet loss test.");
        let stdout = self
            .commands
            .run(&self.program, &self.params.to_args())
            .await?
            .into_stdout(&self.program)?;
        let record = parse_packet_loss(&stdout).into_record();
        info!(loss = ?record.loss_percentage, "Completed packet loss test.");
        Ok(ProbePayload::PacketLoss(record))
    }
}
