// src/core/probes/scan.rs

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::Probe;
use crate::core::error::ProbeError;
use crate::core::models::{ProbeName, ProbePayload};
use crate::core::tools::HostDiscovery;

pub struct ScanProbe {
    discovery: Arc<dyn HostDiscovery>,
    subnet: String,
}

impl ScanProbe {
    pub fn new(discovery: Arc<dyn HostDiscovery>, subnet: String) -> Self {
        Self { discovery, subnet }
    }
}

#[async_trait]
impl Probe for ScanProbe {
    fn name(&self) -> ProbeName {
        ProbeName::ConnectedDevices
    }

    async fn run(&self) -> Result<ProbePayload, ProbeError> {
        info!(subnet = %self.subnet, "Starting network scan.");
        let devices = self.discovery.discover(&self.subnet).await?;
        info!(devices = devices.len(), "Completed network scan.");
        Ok(ProbePayload::Devices(devices))
    }
}
