// src/core/tools/mod.rs

//! Boundaries to the outside world: subprocesses, OS interface state, the bandwidth-test
//! service and host discovery. Probes only see these traits, so the orchestrator can be
//! driven by fakes.

pub mod bandwidth;
pub mod command;
pub mod discovery;
pub mod interfaces;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::error::ProbeError;
use crate::core::models::{BandwidthSample, ConnectedDevice, InterfaceInfo};

pub use bandwidth::HttpBandwidthClient;
pub use command::SystemCommandRunner;
pub use discovery::NmapDiscovery;
pub use interfaces::SysfsInterfaceSource;

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Returns stdout, or an execution failure when the tool exited unsuccessfully.
    pub fn into_stdout(self, tool: &str) -> Result<String, ProbeError> {
        if self.success {
            return Ok(self.stdout);
        }
        let status = self
            .code
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "a signal".to_string());
        let detail = self.stderr.trim();
        Err(ProbeError::ExecutionFailed(if detail.is_empty() {
            format!("{tool} exited with {status}")
        } else {
            format!("{tool} exited with {status}: {detail}")
        }))
    }
}

/// Runs an external executable and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Must report a missing executable as [`ProbeError::ToolMissing`].
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ProbeError>;
}

/// Per-interface link state from the operating system.
#[async_trait]
pub trait InterfaceSource: Send + Sync {
    async fn interfaces(&self) -> Result<BTreeMap<String, InterfaceInfo>, ProbeError>;
}

/// Measures raw download/upload rates and latency.
#[async_trait]
pub trait BandwidthClient: Send + Sync {
    async fn measure(&self) -> Result<BandwidthSample, ProbeError>;
}

/// Discovers hosts on a subnet.
#[async_trait]
pub trait HostDiscovery: Send + Sync {
    async fn discover(&self, subnet: &str) -> Result<Vec<ConnectedDevice>, ProbeError>;
}

/// The set of collaborators shared read-only by every probe of a run.
#[derive(Clone)]
pub struct Toolbox {
    pub commands: Arc<dyn CommandRunner>,
    pub interfaces: Arc<dyn InterfaceSource>,
    pub bandwidth: Arc<dyn BandwidthClient>,
    pub discovery: Arc<dyn HostDiscovery>,
}

impl Toolbox {
    /// Wires the production adapters from `config`.
    pub fn system(config: &AppConfig) -> Result<Self, ProbeError> {
        let commands: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
        Ok(Self {
            interfaces: Arc::new(SysfsInterfaceSource::default()),
            bandwidth: Arc::new(HttpBandwidthClient::new(&config.speedtest)?),
            discovery: Arc::new(NmapDiscovery::new(commands.clone(), config.tools.nmap.clone())),
            commands,
        })
    }

    pub fn with_commands(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_interfaces(mut self, interfaces: Arc<dyn InterfaceSource>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: Arc<dyn BandwidthClient>) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn HostDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }
}
