// src/core/parser/host_scan.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::lines;
use crate::core::models::ConnectedDevice;

// `Nmap scan report for router.lan (192.168.1.1)` or `Nmap scan report for 192.168.1.7`
static RE_REPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Nmap scan report for (?:(?P<name>\S+) \((?P<ip>[^)]+)\)|(?P<bare>\S+))$")
        .expect("valid host report regex")
});
static RE_HOST_UP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Host is up\b").expect("valid host status regex"));
static RE_MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^MAC Address: (?P<mac>[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5})")
        .expect("valid MAC regex")
});

const STATUS_UP: &str = "up";
const STATUS_DOWN: &str = "down";

/// Parses the normal (human-readable) output of an `nmap -sn` host discovery run.
///
/// Hosts are returned in the order nmap reported them. A host is `up` once a
/// `Host is up` line follows its report line, `down` otherwise.
pub fn parse_host_scan(output: &str) -> Vec<ConnectedDevice> {
    let mut devices: Vec<ConnectedDevice> = Vec::new();

    for line in lines(output).map(str::trim) {
        if let Some(caps) = RE_REPORT.captures(line) {
            let (ip, hostname) = match (caps.name("ip"), caps.name("bare")) {
                (Some(ip), _) => (
                    ip.as_str(),
                    caps.name("name").map(|m| m.as_str()).unwrap_or_default(),
                ),
                (None, Some(bare)) => (bare.as_str(), ""),
                (None, None) => continue,
            };
            devices.push(ConnectedDevice {
                ip: ip.to_string(),
                mac: None,
                hostname: hostname.to_string(),
                status: STATUS_DOWN.to_string(),
            });
            continue;
        }

        let Some(current) = devices.last_mut() else {
            continue;
        };
        if RE_HOST_UP.is_match(line) {
            current.status = STATUS_UP.to_string();
        } else if let Some(caps) = RE_MAC.captures(line) {
            current.mac = Some(caps["mac"].to_string());
        }
    }

    debug!(hosts = devices.len(), "Parsed host discovery output.");
    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN: &str = "\
Starting Nmap 7.94 ( https://nmap.org ) at 2024-05-01 10:00 CEST
Nmap scan report for router.lan (192.168.1.1)
Host is up (0.0021s latency).
MAC Address: AA:BB:CC:DD:EE:01 (Ubiquiti Networks)
Nmap scan report for 192.168.1.23
Host is up (0.012s latency).
Nmap scan report for printer.lan (192.168.1.40)
Host is up (0.0042s latency).
MAC Address: aa:bb:cc:dd:ee:40 (Brother Industries)
Nmap done: 256 IP addresses (3 hosts up) scanned in 2.41 seconds
";

    #[test]
    fn reads_every_reported_host_in_order() {
        let devices = parse_host_scan(SCAN);
        let ips: Vec<&str> = devices.iter().map(|d| d.ip.as_str()).collect();
        assert_eq!(ips, vec!["192.168.1.1", "192.168.1.23", "192.168.1.40"]);
        assert!(devices.iter().all(|d| d.status == "up"));
    }

    #[test]
    fn keeps_hostname_and_mac_when_present() {
        let devices = parse_host_scan(SCAN);
        assert_eq!(devices[0].hostname, "router.lan");
        assert_eq!(devices[0].mac.as_deref(), Some("AA:BB:CC:DD:EE:01"));
        assert_eq!(devices[2].mac.as_deref(), Some("aa:bb:cc:dd:ee:40"));
    }

    #[test]
    fn bare_address_has_no_hostname_or_mac() {
        let devices = parse_host_scan(SCAN);
        assert_eq!(devices[1].hostname, "");
        assert!(devices[1].mac.is_none());
    }

    #[test]
    fn host_without_status_line_is_down() {
        let devices = parse_host_scan("Nmap scan report for 10.0.0.9\n");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].status, "down");
    }

    #[test]
    fn unrelated_output_yields_nothing() {
        assert!(parse_host_scan("Note: Host seems down.\n").is_empty());
    }
}
