// src/core/tools/discovery.rs

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{CommandRunner, HostDiscovery};
use crate::core::error::ProbeError;
use crate::core::models::ConnectedDevice;
use crate::core::parser::host_scan::parse_host_scan;

/// Ping-sweeps a subnet with `nmap -sn` and parses its normal output.
pub struct NmapDiscovery {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl NmapDiscovery {
    pub fn new(runner: Arc<dyn CommandRunner>, program: String) -> Self {
        Self { runner, program }
    }
}

#[async_trait]
impl HostDiscovery for NmapDiscovery {
    async fn discover(&self, subnet: &str) -> Result<Vec<ConnectedDevice>, ProbeError> {
        info!(subnet, "Starting host discovery.");
        let args = vec!["-sn".to_string(), subnet.to_string()];
        let stdout = self.runner.run(&self.program, &args).await?.into_stdout(&self.program)?;
        let devices = parse_host_scan(&stdout);
        info!(hosts = devices.len(), "Completed host discovery.");
        Ok(devices)
    }
}
