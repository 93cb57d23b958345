// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::{debug, info};

use netprobe::{config, logging, Orchestrator, ProbeRequest, Toolbox};

/// Run network diagnostics concurrently and print one JSON report.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Skip the bandwidth speed test
    #[arg(long)]
    no_speed: bool,

    /// Skip interface and ping diagnostics
    #[arg(long)]
    no_diagnostics: bool,

    /// Skip the local network device scan
    #[arg(long)]
    no_scan: bool,

    /// Skip the throughput stress test
    #[arg(long)]
    no_stress: bool,

    /// Also run the UDP packet loss test
    #[arg(long)]
    packet_loss: bool,

    /// Throughput-test server used by the stress and packet loss tests
    #[arg(long, value_name = "HOST")]
    target: Option<String>,

    /// Stress test duration in seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,

    /// Number of parallel stress test streams
    #[arg(long, value_name = "STREAMS")]
    parallel: Option<u32>,

    /// Run the stress test over UDP
    #[arg(long, conflicts_with = "tcp")]
    udp: bool,

    /// Run the stress test over TCP, even when the config file enables UDP
    #[arg(long)]
    tcp: bool,

    /// Stress test bandwidth ceiling in UDP mode, e.g. 10G
    #[arg(long)]
    bandwidth: Option<String>,

    /// Packet loss test duration in seconds
    #[arg(long, value_name = "SECS")]
    loss_duration: Option<u64>,

    /// Packet loss test bandwidth, e.g. 10M
    #[arg(long)]
    loss_bandwidth: Option<String>,

    /// Subnet to scan for devices, e.g. 192.168.1.0/24
    #[arg(long)]
    subnet: Option<String>,

    /// YAML configuration file
    #[arg(long, value_name = "FILE", env = "NETPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Print the report on a single line
    #[arg(long)]
    compact: bool,
}

impl Cli {
    /// `None` leaves the configured transport in place.
    fn transport(&self) -> Option<bool> {
        match (self.udp, self.tcp) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn to_request(&self) -> ProbeRequest {
        ProbeRequest {
            speed: !self.no_speed,
            diagnostics: !self.no_diagnostics,
            scan: !self.no_scan,
            stress: !self.no_stress,
            packet_loss: self.packet_loss,
            target: self.target.clone(),
            stress_duration_secs: self.duration,
            parallel_streams: self.parallel,
            udp: self.transport(),
            stress_bandwidth: self.bandwidth.clone(),
            packet_loss_duration_secs: self.loss_duration,
            packet_loss_bandwidth: self.loss_bandwidth.clone(),
            subnet: self.subnet.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    logging::initialize_logging(&config.logging).wrap_err("Unable to configure logging")?;
    debug!(?config, "Configuration loaded.");

    let request = cli.to_request();
    let toolbox = Toolbox::system(&config).wrap_err("Unable to set up probe tools")?;
    let orchestrator = Orchestrator::new(config, toolbox);

    let report = orchestrator.run(&request).await;
    info!(probes = report.len(), "Report assembled.");

    let rendered = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_gives_the_default_request() {
        let cli = Cli::parse_from(["netprobe"]);
        assert_eq!(cli.to_request(), ProbeRequest::default());
    }

    #[test]
    fn flags_toggle_probes_and_fill_overrides() {
        let cli = Cli::parse_from([
            "netprobe", "--no-speed", "--no-scan", "--packet-loss", "--udp", "--target", "10.0.0.2",
            "--parallel", "8",
        ]);
        let request = cli.to_request();
        assert!(!request.speed);
        assert!(!request.scan);
        assert!(request.diagnostics);
        assert!(request.packet_loss);
        assert_eq!(request.udp, Some(true));
        assert_eq!(request.target.as_deref(), Some("10.0.0.2"));
        assert_eq!(request.parallel_streams, Some(8));
    }

    #[test]
    fn tcp_flag_overrides_a_udp_config() {
        let mut config = netprobe::config::AppConfig::default();
        config.stress.udp = true;

        let request = Cli::parse_from(["netprobe", "--tcp"]).to_request();
        assert_eq!(request.udp, Some(false));
        let params = netprobe::core::probes::stress::StressParams::resolve(&request, &config.stress);
        assert!(!params.udp);
        assert!(!params.to_args().contains(&"-u".to_string()));

        let request = Cli::parse_from(["netprobe"]).to_request();
        assert_eq!(request.udp, None);
        assert!(netprobe::core::probes::stress::StressParams::resolve(&request, &config.stress).udp);
    }

    #[test]
    fn udp_and_tcp_flags_conflict() {
        assert!(Cli::try_parse_from(["netprobe", "--udp", "--tcp"]).is_err());
    }
}
