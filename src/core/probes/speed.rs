// src/core/probes/speed.rs

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::Probe;
use crate::core::error::ProbeError;
use crate::core::models::{BandwidthSample, ProbeName, ProbePayload, SpeedTestResult};
use crate::core::tools::BandwidthClient;

const BITS_PER_MEGABIT: f64 = 1_000_000.0;
const RATE_UNIT: &str = "Mbps";

pub struct SpeedProbe {
    client: Arc<dyn BandwidthClient>,
}

impl SpeedProbe {
    pub fn new(client: Arc<dyn BandwidthClient>) -> Self {
        Self { client }
    }
}

/// Formats raw rates as megabits with two decimals, e.g. `"94.20 Mbps"`.
pub fn format_speed(sample: &BandwidthSample) -> SpeedTestResult {
    SpeedTestResult {
        download_speed: format!("{:.2} {RATE_UNIT}", sample.download_bps / BITS_PER_MEGABIT),
        upload_speed: format!("{:.2} {RATE_UNIT}", sample.upload_bps / BITS_PER_MEGABIT),
        ping: format!("{:.2} ms", sample.ping_ms),
    }
}

#[async_trait]
impl Probe for SpeedProbe {
    fn name(&self) -> ProbeName {
        ProbeName::Speedtest
    }

    async fn run(&self) -> Result<ProbePayload, ProbeError> {
        info!("Starting speed test.");
        let sample = self.client.measure().await?;
        let result = format_speed(&sample);
        info!(download = %result.download_speed, upload = %result.upload_speed, "Completed speed test.");
        Ok(ProbePayload::Speedtest(result))
    }
}
