// src/config.rs

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name looked up in the project config directory when no path is given.
pub const CONFIG_FILE: &str = "config.yml";

/// Application configuration, injected into the orchestrator at construction.
///
/// Every section has defaults, so an empty or partial YAML document is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub tools: ToolPaths,
    pub diagnostics: DiagnosticsConfig,
    pub scan: ScanConfig,
    pub stress: StressConfig,
    pub packet_loss: PacketLossConfig,
    pub speedtest: SpeedtestConfig,
    /// Upper bound for a single probe. A probe exceeding it reports a timeout
    /// instead of stalling the whole report. Unbounded when unset.
    pub probe_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    Stderr,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default verbosity for this crate; `RUST_LOG` takes precedence.
    pub level: String,
    pub sink: LogSink,
    /// Log file for the `file` sink. Defaults to the project data directory.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), sink: LogSink::Stderr, file: None }
    }
}

/// Executable names or absolute paths of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub iperf3: String,
    pub ping: String,
    pub nmap: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self { iperf3: "iperf3".to_string(), ping: "ping".to_string(), nmap: "nmap".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub google_dns: String,
    pub cloudflare_dns: String,
    pub ping_count: u32,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            google_dns: "8.8.8.8".to_string(),
            cloudflare_dns: "1.1.1.1".to_string(),
            ping_count: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub subnet: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { subnet: "192.168.1.0/24".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub server: String,
    pub duration_secs: u64,
    pub parallel_streams: u32,
    pub udp: bool,
    /// Target bandwidth ceiling, only passed in UDP mode.
    pub bandwidth: String,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            duration_secs: 2,
            parallel_streams: 25,
            udp: false,
            bandwidth: "10G".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketLossConfig {
    pub server: String,
    pub duration_secs: u64,
    pub bandwidth: String,
}

impl Default for PacketLossConfig {
    fn default() -> Self {
        Self { server: "127.0.0.1".to_string(), duration_secs: 10, bandwidth: "10M".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedtestConfig {
    /// Base URL of a server exposing `__down?bytes=N` and `__up`.
    pub endpoint: String,
    pub download_bytes: u64,
    pub upload_bytes: u64,
    pub ping_samples: u32,
    pub timeout_secs: u64,
}

impl Default for SpeedtestConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://speed.cloudflare.com/".to_string(),
            download_bytes: 25_000_000,
            upload_bytes: 10_000_000,
            ping_samples: 5,
            timeout_secs: 60,
        }
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "netprobe", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

/// Loads the configuration.
///
/// An explicit `path` must exist. Without one, `config.yml` in the project config
/// directory is used if present, and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => {
            let fallback = get_config_dir().join(CONFIG_FILE);
            if !fallback.is_file() {
                debug!(path = %fallback.display(), "No config file found, using defaults.");
                return Ok(AppConfig::default());
            }
            fallback
        }
    };

    let contents = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents).wrap_err_with(|| format!("Invalid config file {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    // serde_yaml rejects a blank document instead of defaulting it
    if contents.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    Ok(serde_yaml::from_str(contents)?)
}
