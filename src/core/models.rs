// src/core/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString};

// --- Probe Identity ---

/// The name of a probe, doubling as its key in the final report.
///
/// Variants are declared in the alphabetical order of their report keys, so the
/// derived `Ord` keeps the report stable by name regardless of completion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    AsRefStr, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProbeName {
    ConnectedDevices,
    NetworkDiagnostics,
    PacketLoss,
    Speedtest,
    StressTest,
}

// --- Probe Request ---

/// Identifies which probes run and carries optional per-probe parameter overrides.
///
/// Overrides left as `None` fall back to the values in [`crate::config::AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeRequest {
    pub speed: bool,
    pub diagnostics: bool,
    pub scan: bool,
    pub stress: bool,
    pub packet_loss: bool,

    /// Host running the throughput-test server, shared by stress and packet-loss probes.
    pub target: Option<String>,
    pub stress_duration_secs: Option<u64>,
    pub parallel_streams: Option<u32>,
    pub udp: Option<bool>,
    pub stress_bandwidth: Option<String>,
    pub packet_loss_duration_secs: Option<u64>,
    pub packet_loss_bandwidth: Option<String>,
    pub subnet: Option<String>,
}

impl Default for ProbeRequest {
    fn default() -> Self {
        Self {
            speed: true,
            diagnostics: true,
            scan: true,
            stress: true,
            packet_loss: false,
            target: None,
            stress_duration_secs: None,
            parallel_streams: None,
            udp: None,
            stress_bandwidth: None,
            packet_loss_duration_secs: None,
            packet_loss_bandwidth: None,
            subnet: None,
        }
    }
}

impl ProbeRequest {
    /// A request with every probe disabled. Useful as a base for builder-style setup.
    pub fn none() -> Self {
        Self {
            speed: false,
            diagnostics: false,
            scan: false,
            stress: false,
            packet_loss: false,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self, name: ProbeName) -> bool {
        match name {
            ProbeName::ConnectedDevices => self.scan,
            ProbeName::NetworkDiagnostics => self.diagnostics,
            ProbeName::PacketLoss => self.packet_loss,
            ProbeName::Speedtest => self.speed,
            ProbeName::StressTest => self.stress,
        }
    }

    /// Lists the enabled probes in report order.
    pub fn enabled_probes(&self) -> Vec<ProbeName> {
        use strum::IntoEnumIterator;
        ProbeName::iter().filter(|name| self.is_enabled(*name)).collect()
    }
}

// --- Speed Test Models ---

/// Raw figures reported by a bandwidth-test client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandwidthSample {
    /// Download rate in bits per second.
    pub download_bps: f64,
    /// Upload rate in bits per second.
    pub upload_bps: f64,
    /// Round-trip latency in milliseconds.
    pub ping_ms: f64,
}

/// Human-readable speed test result, e.g. `"94.20 Mbps"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedTestResult {
    pub download_speed: String,
    pub upload_speed: String,
    pub ping: String,
}

// --- Diagnostics Models ---

/// Link state of a single network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub is_up: bool,
    /// Negotiated link speed, e.g. `"1000 Mbps"`. `"0 Mbps"` when the OS does not report one.
    pub speed: String,
    pub duplex: Duplex,
    pub mtu: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Duplex {
    Full,
    Half,
    Unknown,
}

/// Interface state plus the raw reachability output of the two fixed ping targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDiagnostics {
    pub network_info: BTreeMap<String, InterfaceInfo>,
    pub ping_google: String,
    pub ping_cloudflare: String,
}

// --- Scan Models ---

/// A host found by the discovery client on the configured subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedDevice {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    pub hostname: String,
    pub status: String,
}

// --- Throughput Models ---

/// One per-interval row of throughput-test output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalResult {
    pub interval: String,
    pub transfer: String,
    pub bandwidth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputSummary {
    pub total_transfer: String,
    pub average_bandwidth: String,
}

/// Structured form of a throughput-test run.
///
/// `summary` serializes as `{}` when no summary line was found, and `error` is only
/// present when the output could not be fully interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThroughputRecord {
    pub connection_info: String,
    pub test_results: Vec<IntervalResult>,
    #[serde(serialize_with = "summary_or_empty")]
    pub summary: Option<ThroughputSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Packet Loss Models ---

/// Datagram counters from a UDP loss test, kept as the tool printed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketLossRecord {
    pub datagrams_sent: Option<String>,
    pub datagrams_received: Option<String>,
    pub lost_datagrams: Option<String>,
    pub loss_percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Outcomes ---

/// The success payload of a probe; its shape depends on which probe produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbePayload {
    Speedtest(SpeedTestResult),
    Diagnostics(NetworkDiagnostics),
    Devices(Vec<ConnectedDevice>),
    Throughput(ThroughputRecord),
    PacketLoss(PacketLossRecord),
}

/// A contained probe failure. Only the message reaches the serialized report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    #[serde(skip)]
    pub probe: ProbeName,
    pub error: String,
}

/// The result of exactly one enabled probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeOutcome {
    Success(ProbePayload),
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    pub fn failure(probe: ProbeName, error: impl Into<String>) -> Self {
        ProbeOutcome::Failure(ProbeFailure { probe, error: error.into() })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProbeOutcome::Failure(_))
    }

    pub fn payload(&self) -> Option<&ProbePayload> {
        match self {
            ProbeOutcome::Success(payload) => Some(payload),
            ProbeOutcome::Failure(_) => None,
        }
    }
}

/// Serializes `None` as an empty JSON object rather than `null`.
fn summary_or_empty<S: serde::Serializer>(
    value: &Option<ThroughputSummary>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    match value {
        Some(summary) => summary.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
