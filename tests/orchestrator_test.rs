use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

use netprobe::config::AppConfig;
use netprobe::core::models::{
    BandwidthSample, ConnectedDevice, Duplex, InterfaceInfo, PacketLossRecord, ProbePayload,
};
use netprobe::core::probes::Probe;
use netprobe::core::tools::{
    BandwidthClient, CommandOutput, CommandRunner, HostDiscovery, InterfaceSource,
    SystemCommandRunner,
};
use netprobe::{Orchestrator, ProbeError, ProbeName, ProbeOutcome, ProbeRequest, Toolbox};

const IPERF_TCP: &str = "\
Connecting to host 127.0.0.1, port 5201
[  5] local 127.0.0.1 port 50432 connected to 127.0.0.1 port 5201
[ ID] Interval           Transfer     Bitrate         Retr  Cwnd
[  5]   0.00-1.00   sec  5.12 GBytes  44.0 Gbits/sec    0   1.25 MBytes
[  5]   1.00-2.00   sec  5.20 GBytes  44.7 Gbits/sec    0   1.25 MBytes
- - - - - - - - - - - - - - - - - - - - - - - - -
[ ID] Interval           Transfer     Bitrate         Retr
[  5]   0.00-2.00   sec  10.3 GBytes  44.3 Gbits/sec    0             sender
[  5]   0.00-2.00   sec  10.3 GBytes  44.3 Gbits/sec                  receiver

iperf Done.
";

const IPERF_UDP_LOSS: &str = "\
Connecting to host 127.0.0.1, port 5201
[SUM] datagrams total: 100 sent, 95 datagrams received, 5 lost (5.2%)
iperf Done.
";

/// What the scripted runner does when a given program is invoked.
#[derive(Clone)]
enum Script {
    Stdout(&'static str),
    Missing,
    Hang,
    Panic,
}

/// Answers by program name, and for `iperf3` by whether `-u` is among the args.
#[derive(Clone, Default)]
struct ScriptedRunner {
    scripts: HashMap<&'static str, Script>,
}

impl ScriptedRunner {
    fn with(mut self, key: &'static str, script: Script) -> Self {
        self.scripts.insert(key, script);
        self
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ProbeError> {
        let key = match program {
            "iperf3" if args.iter().any(|a| a == "-u") && !args.iter().any(|a| a == "-P") => "iperf3-udp",
            "iperf3" => "iperf3",
            "ping" => "ping",
            _ => "other",
        };
        match self.scripts.get(key).cloned().unwrap_or(Script::Missing) {
            Script::Stdout(stdout) => Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout: format!("{stdout}{}", args.last().map(String::as_str).unwrap_or_default()),
                stderr: String::new(),
            }),
            Script::Missing => Err(ProbeError::ToolMissing { tool: program.to_string() }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("hung tool should have been timed out")
            }
            Script::Panic => panic!("scripted tool crash"),
        }
    }
}

struct StaticInterfaces;

#[async_trait]
impl InterfaceSource for StaticInterfaces {
    async fn interfaces(&self) -> Result<BTreeMap<String, InterfaceInfo>, ProbeError> {
        Ok(BTreeMap::from([(
            "eth0".to_string(),
            InterfaceInfo { is_up: true, speed: "1000 Mbps".to_string(), duplex: Duplex::Full, mtu: 1500 },
        )]))
    }
}

struct StaticBandwidth(Option<BandwidthSample>);

#[async_trait]
impl BandwidthClient for StaticBandwidth {
    async fn measure(&self) -> Result<BandwidthSample, ProbeError> {
        self.0.ok_or_else(|| ProbeError::Bandwidth("connection reset".to_string()))
    }
}

struct StaticDiscovery {
    panic: bool,
}

#[async_trait]
impl HostDiscovery for StaticDiscovery {
    async fn discover(&self, subnet: &str) -> Result<Vec<ConnectedDevice>, ProbeError> {
        if self.panic {
            panic!("scripted discovery crash");
        }
        Ok(vec![ConnectedDevice {
            ip: subnet.trim_end_matches("0/24").to_string() + "1",
            mac: Some("AA:BB:CC:DD:EE:01".to_string()),
            hostname: "router.lan".to_string(),
            status: "up".to_string(),
        }])
    }
}

fn healthy_toolbox() -> Toolbox {
    Toolbox {
        commands: Arc::new(
            ScriptedRunner::default()
                .with("iperf3", Script::Stdout(IPERF_TCP))
                .with("iperf3-udp", Script::Stdout(IPERF_UDP_LOSS))
                .with("ping", Script::Stdout("4 packets transmitted, 4 received to ")),
        ),
        interfaces: Arc::new(StaticInterfaces),
        bandwidth: Arc::new(StaticBandwidth(Some(BandwidthSample {
            download_bps: 250_000_000.0,
            upload_bps: 40_000_000.0,
            ping_ms: 9.0,
        }))),
        discovery: Arc::new(StaticDiscovery { panic: false }),
    }
}

fn request_from_mask(mask: u8) -> ProbeRequest {
    ProbeRequest {
        speed: mask & 0b00001 != 0,
        diagnostics: mask & 0b00010 != 0,
        scan: mask & 0b00100 != 0,
        stress: mask & 0b01000 != 0,
        packet_loss: mask & 0b10000 != 0,
        ..ProbeRequest::none()
    }
}

#[tokio::test]
async fn report_has_exactly_one_key_per_enabled_probe() {
    let orchestrator = Orchestrator::new(AppConfig::default(), healthy_toolbox());

    for mask in 0u8..32 {
        let request = request_from_mask(mask);
        let report = orchestrator.run(&request).await;

        assert_eq!(report.len(), mask.count_ones() as usize, "mask {mask:05b}");
        assert_eq!(report.keys().collect::<Vec<_>>(), request.enabled_probes());

        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().expect("report is an object");
        assert_eq!(object.len(), report.len());
        for name in request.enabled_probes() {
            assert!(object.contains_key(name.as_ref()), "missing {name}");
        }
    }
}

#[tokio::test]
async fn missing_throughput_tool_only_fails_the_stress_entry() {
    let mut config = AppConfig::default();
    config.tools.iperf3 = "/nonexistent/netprobe-test/iperf3".to_string();
    let toolbox = healthy_toolbox().with_commands(Arc::new(SystemCommandRunner));
    let orchestrator = Orchestrator::new(config, toolbox);

    let request = ProbeRequest { stress: true, ..ProbeRequest::none() };
    let report = orchestrator.run(&request).await;

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({ "stress_test": { "error": "tool not found" } })
    );
}

#[tokio::test]
async fn failing_probes_do_not_affect_siblings() {
    let toolbox = healthy_toolbox()
        .with_bandwidth(Arc::new(StaticBandwidth(None)))
        .with_discovery(Arc::new(StaticDiscovery { panic: true }));
    let orchestrator = Orchestrator::new(AppConfig::default(), toolbox);

    let request = ProbeRequest { packet_loss: true, ..ProbeRequest::default() };
    let report = orchestrator.run(&request).await;

    assert_eq!(report.len(), 5);
    assert_eq!(
        report.failures().collect::<Vec<_>>(),
        vec![ProbeName::ConnectedDevices, ProbeName::Speedtest]
    );

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["speedtest"], json!({ "error": "bandwidth test failed: connection reset" }));
    assert!(value["connected_devices"]["error"]
        .as_str()
        .unwrap()
        .starts_with("probe task failed"));

    assert_eq!(value["stress_test"]["summary"]["total_transfer"], "10.3 GBytes");
    assert_eq!(value["stress_test"]["test_results"].as_array().unwrap().len(), 2);
    assert_eq!(value["packet_loss"]["loss_percentage"], "5.2");
    assert_eq!(value["network_diagnostics"]["network_info"]["eth0"]["mtu"], 1500);
}

#[tokio::test]
async fn crashing_tool_is_contained() {
    let toolbox = healthy_toolbox().with_commands(Arc::new(
        ScriptedRunner::default()
            .with("iperf3", Script::Panic)
            .with("ping", Script::Stdout("pong ")),
    ));
    let orchestrator = Orchestrator::new(AppConfig::default(), toolbox);

    let request = ProbeRequest { stress: true, diagnostics: true, ..ProbeRequest::none() };
    let report = orchestrator.run(&request).await;

    assert!(report.get(ProbeName::StressTest).unwrap().is_failure());
    assert!(!report.get(ProbeName::NetworkDiagnostics).unwrap().is_failure());
}

#[tokio::test]
async fn successful_run_shapes_every_entry() {
    let orchestrator = Orchestrator::new(AppConfig::default(), healthy_toolbox());
    let request = ProbeRequest { packet_loss: true, ..ProbeRequest::default() };

    let value = serde_json::to_value(orchestrator.run(&request).await).unwrap();

    assert_eq!(
        value["speedtest"],
        json!({ "download_speed": "250.00 Mbps", "upload_speed": "40.00 Mbps", "ping": "9.00 ms" })
    );
    assert_eq!(
        value["network_diagnostics"]["ping_google"],
        "4 packets transmitted, 4 received to 8.8.8.8"
    );
    assert_eq!(
        value["network_diagnostics"]["ping_cloudflare"],
        "4 packets transmitted, 4 received to 1.1.1.1"
    );
    assert_eq!(
        value["connected_devices"],
        json!([{ "ip": "192.168.1.1", "mac": "AA:BB:CC:DD:EE:01", "hostname": "router.lan", "status": "up" }])
    );
    assert_eq!(
        value["stress_test"]["connection_info"],
        "Connecting to host 127.0.0.1, port 5201"
    );
    assert_eq!(
        value["packet_loss"],
        json!({
            "datagrams_sent": "100",
            "datagrams_received": "95",
            "lost_datagrams": "5",
            "loss_percentage": "5.2",
        })
    );
}

#[tokio::test]
async fn request_overrides_reach_the_probes() {
    let orchestrator = Orchestrator::new(AppConfig::default(), healthy_toolbox());
    let request = ProbeRequest {
        scan: true,
        subnet: Some("10.20.30.0/24".to_string()),
        ..ProbeRequest::none()
    };

    let report = orchestrator.run(&request).await;

    let Some(ProbeOutcome::Success(ProbePayload::Devices(devices))) =
        report.get(ProbeName::ConnectedDevices)
    else {
        panic!("expected devices");
    };
    assert_eq!(devices[0].ip, "10.20.30.1");
}

#[tokio::test]
async fn hung_probe_times_out_without_stalling_others() {
    let config = AppConfig { probe_timeout_secs: Some(1), ..AppConfig::default() };
    let toolbox = healthy_toolbox().with_commands(Arc::new(
        ScriptedRunner::default()
            .with("iperf3", Script::Hang)
            .with("ping", Script::Stdout("pong ")),
    ));
    let orchestrator = Orchestrator::new(config, toolbox);

    let request = ProbeRequest { stress: true, speed: true, ..ProbeRequest::none() };
    let report = orchestrator.run(&request).await;

    assert_eq!(
        serde_json::to_value(report.get(ProbeName::StressTest).unwrap()).unwrap(),
        json!({ "error": "timed out after 1s" })
    );
    assert!(!report.get(ProbeName::Speedtest).unwrap().is_failure());
}

#[tokio::test]
async fn repeated_runs_produce_identical_reports() {
    let orchestrator = Orchestrator::new(AppConfig::default(), healthy_toolbox());
    let request = ProbeRequest { packet_loss: true, ..ProbeRequest::default() };

    let first = orchestrator.run(&request).await;
    let second = orchestrator.run(&request).await;

    assert_eq!(first, second);
}

/// Completes only once its partner reaches the same barrier.
struct Rendezvous {
    name: ProbeName,
    barrier: Arc<Barrier>,
}

#[async_trait]
impl Probe for Rendezvous {
    fn name(&self) -> ProbeName {
        self.name
    }

    async fn run(&self) -> Result<ProbePayload, ProbeError> {
        self.barrier.wait().await;
        Ok(ProbePayload::PacketLoss(PacketLossRecord::default()))
    }
}

#[tokio::test]
async fn all_probes_run_at_the_same_time() {
    let orchestrator = Orchestrator::new(AppConfig::default(), healthy_toolbox());
    let barrier = Arc::new(Barrier::new(2));
    let probes: Vec<Arc<dyn Probe>> = [ProbeName::PacketLoss, ProbeName::StressTest]
        .into_iter()
        .map(|name| -> Arc<dyn Probe> { Arc::new(Rendezvous { name, barrier: barrier.clone() }) })
        .collect();

    let report = tokio::time::timeout(Duration::from_secs(5), orchestrator.run_probes(probes))
        .await
        .expect("probes awaited one by one never meet at the barrier");

    assert_eq!(report.keys().collect::<Vec<_>>(), vec![ProbeName::PacketLoss, ProbeName::StressTest]);
    assert_eq!(report.failures().count(), 0);
}
