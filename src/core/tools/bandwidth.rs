// src/core/tools/bandwidth.rs

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::BandwidthClient;
use crate::config::SpeedtestConfig;
use crate::core::error::ProbeError;
use crate::core::models::BandwidthSample;

/// Measures bandwidth over HTTP against a server exposing `__down?bytes=N` and `__up`
/// (the layout used by speed.cloudflare.com).
#[derive(Debug, Clone)]
pub struct HttpBandwidthClient {
    client: reqwest::Client,
    endpoint: Url,
    download_bytes: u64,
    upload_bytes: u64,
    ping_samples: u32,
}

impl HttpBandwidthClient {
    pub fn new(config: &SpeedtestConfig) -> Result<Self, ProbeError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ProbeError::Bandwidth(format!("invalid endpoint {}: {e}", config.endpoint)))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("netprobe/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            download_bytes: config.download_bytes,
            upload_bytes: config.upload_bytes,
            ping_samples: config.ping_samples.max(1),
        })
    }

    fn download_url(&self, bytes: u64) -> Result<Url, ProbeError> {
        let mut url = self
            .endpoint
            .join("__down")
            .map_err(|e| ProbeError::Bandwidth(e.to_string()))?;
        url.query_pairs_mut().append_pair("bytes", &bytes.to_string());
        Ok(url)
    }

    /// Best round-trip time of several zero-byte downloads, in milliseconds.
    async fn latency(&self) -> Result<f64, ProbeError> {
        let url = self.download_url(0)?;
        let mut best = f64::MAX;
        for _ in 0..self.ping_samples {
            let start = Instant::now();
            self.client.get(url.clone()).send().await?.error_for_status()?.bytes().await?;
            best = best.min(start.elapsed().as_secs_f64() * 1000.0);
        }
        debug!(ping_ms = best, "Latency measured.");
        Ok(best)
    }

    async fn download(&self) -> Result<f64, ProbeError> {
        let url = self.download_url(self.download_bytes)?;
        let start = Instant::now();
        let body = self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        let rate = bits_per_second(body.len() as u64, start.elapsed());
        debug!(bytes = body.len(), bps = rate, "Download measured.");
        Ok(rate)
    }

    async fn upload(&self) -> Result<f64, ProbeError> {
        let url = self
            .endpoint
            .join("__up")
            .map_err(|e| ProbeError::Bandwidth(e.to_string()))?;
        let payload = vec![0u8; self.upload_bytes as usize];
        let start = Instant::now();
        self.client.post(url).body(payload).send().await?.error_for_status()?;
        let rate = bits_per_second(self.upload_bytes, start.elapsed());
        debug!(bytes = self.upload_bytes, bps = rate, "Upload measured.");
        Ok(rate)
    }
}

fn bits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    (bytes as f64 * 8.0) / elapsed.as_secs_f64().max(f64::EPSILON)
}

#[async_trait]
impl BandwidthClient for HttpBandwidthClient {
    async fn measure(&self) -> Result<BandwidthSample, ProbeError> {
        info!(endpoint = %self.endpoint, "Starting bandwidth measurement.");
        let ping_ms = self.latency().await?;
        let download_bps = self.download().await?;
        let upload_bps = self.upload().await?;
        Ok(BandwidthSample { download_bps, upload_bps, ping_ms })
    }
}
