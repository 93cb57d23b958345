// src/core/probes/diagnostics.rs

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use super::Probe;
use crate::config::{DiagnosticsConfig, ToolPaths};
use crate::core::error::ProbeError;
use crate::core::models::{ProbeName, ProbePayload};
use crate::core::report::diagnostics_entry;
use crate::core::tools::{CommandRunner, InterfaceSource, Toolbox};

/// Interface state plus reachability of two well-known public resolvers.
pub struct DiagnosticsProbe {
    interfaces: Arc<dyn InterfaceSource>,
    commands: Arc<dyn CommandRunner>,
    ping_program: String,
    ping_count: u32,
    google_dns: String,
    cloudflare_dns: String,
}

impl DiagnosticsProbe {
    pub fn new(config: &DiagnosticsConfig, tools: &ToolPaths, toolbox: &Toolbox) -> Self {
        Self {
            interfaces: toolbox.interfaces.clone(),
            commands: toolbox.commands.clone(),
            ping_program: tools.ping.clone(),
            ping_count: config.ping_count,
            google_dns: config.google_dns.clone(),
            cloudflare_dns: config.cloudflare_dns.clone(),
        }
    }

    /// Returns the raw ping output, or the error text if ping could not be run.
    async fn ping(&self, host: &str) -> String {
        info!(host, "Starting ping test.");
        let count_flag = if cfg!(windows) { "-n" } else { "-c" };
        let args = vec![count_flag.to_string(), self.ping_count.to_string(), host.to_string()];
        match self.commands.run(&self.ping_program, &args).await {
            Ok(output) => {
                info!(host, success = output.success, "Completed ping test.");
                if output.stdout.trim().is_empty() { output.stderr } else { output.stdout }
            }
            Err(e) => {
                error!(host, error = %e, "Ping test failed.");
                e.to_string()
            }
        }
    }
}

#[async_trait]
impl Probe for DiagnosticsProbe {
    fn name(&self) -> ProbeName {
        ProbeName::NetworkDiagnostics
    }

    async fn run(&self) -> Result<ProbePayload, ProbeError> {
        info!("Starting network diagnostics.");
        let network_info = self.interfaces.interfaces().await?;
        let (ping_google, ping_cloudflare) =
            tokio::join!(self.ping(&self.google_dns), self.ping(&self.cloudflare_dns));
        info!("Completed network diagnostics.");
        Ok(ProbePayload::Diagnostics(diagnostics_entry(network_info, ping_google, ping_cloudflare)))
    }
}
