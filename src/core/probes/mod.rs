// src/core/probes/mod.rs

//! The five probes. Each one owns its external I/O and returns either a payload or a
//! [`ProbeError`]; containing that error is the orchestrator's job.

pub mod diagnostics;
pub mod packet_loss;
pub mod scan;
pub mod speed;
pub mod stress;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::error::ProbeError;
use crate::core::models::{ProbeName, ProbePayload, ProbeRequest};
use crate::core::tools::Toolbox;

use self::diagnostics::DiagnosticsProbe;
use self::packet_loss::PacketLossProbe;
use self::scan::ScanProbe;
use self::speed::SpeedProbe;
use self::stress::StressProbe;

/// A named, independently-failable diagnostic operation.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> ProbeName;

    async fn run(&self) -> Result<ProbePayload, ProbeError>;
}

/// Builds one probe per enabled name in `request`, resolving parameters against `config`.
pub fn build_probes(
    request: &ProbeRequest,
    config: &AppConfig,
    toolbox: &Toolbox,
) -> Vec<Arc<dyn Probe>> {
    request
        .enabled_probes()
        .into_iter()
        .map(|name| -> Arc<dyn Probe> {
            match name {
                ProbeName::Speedtest => Arc::new(SpeedProbe::new(toolbox.bandwidth.clone())),
                ProbeName::NetworkDiagnostics => {
                    Arc::new(DiagnosticsProbe::new(&config.diagnostics, &config.tools, toolbox))
                }
                ProbeName::ConnectedDevices => Arc::new(ScanProbe::new(
                    toolbox.discovery.clone(),
                    request.subnet.clone().unwrap_or_else(|| config.scan.subnet.clone()),
                )),
                ProbeName::StressTest => Arc::new(StressProbe::new(
                    toolbox.commands.clone(),
                    config.tools.iperf3.clone(),
                    stress::StressParams::resolve(request, &config.stress),
                )),
                ProbeName::PacketLoss => Arc::new(PacketLossProbe::new(
                    toolbox.commands.clone(),
                    config.tools.iperf3.clone(),
                    packet_loss::PacketLossParams::resolve(request, &config.packet_loss),
                )),
            }
        })
        .collect()
}
