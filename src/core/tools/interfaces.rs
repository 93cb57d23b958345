// src/core/tools/interfaces.rs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};

use super::InterfaceSource;
use crate::core::error::ProbeError;
use crate::core::models::{Duplex, InterfaceInfo};

const SYSFS_NET: &str = "/sys/class/net";
/// `IFF_UP` in the interface flags bitmask.
const IFF_UP: u32 = 0x1;

/// Reads interface state from Linux sysfs (`/sys/class/net/<iface>/...`).
#[derive(Debug, Clone)]
pub struct SysfsInterfaceSource {
    root: PathBuf,
}

impl Default for SysfsInterfaceSource {
    fn default() -> Self {
        Self { root: PathBuf::from(SYSFS_NET) }
    }
}

impl SysfsInterfaceSource {
    /// Reads from a different sysfs-shaped directory tree.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl InterfaceSource for SysfsInterfaceSource {
    async fn interfaces(&self) -> Result<BTreeMap<String, InterfaceInfo>, ProbeError> {
        info!("Starting network interface information retrieval.");
        let root = self.root.clone();
        let interfaces = spawn_blocking(move || read_interfaces(&root))
            .await
            .unwrap_or_else(|e| {
                error!(panic = %e, "Blocking interface query panicked!");
                Err(ProbeError::TaskFailed(e.to_string()))
            })?;
        info!(count = interfaces.len(), "Completed network interface information retrieval.");
        Ok(interfaces)
    }
}

fn read_interfaces(root: &Path) -> Result<BTreeMap<String, InterfaceInfo>, ProbeError> {
    let entries = fs::read_dir(root).map_err(|e| {
        error!(root = %root.display(), error = %e, "Cannot list network interfaces.");
        ProbeError::Interfaces(format!("cannot read {}: {e}", root.display()))
    })?;

    let mut interfaces = BTreeMap::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let info = read_interface(&entry.path());
        debug!(interface = %name, is_up = info.is_up, mtu = info.mtu, "Read interface.");
        interfaces.insert(name, info);
    }
    Ok(interfaces)
}

fn read_attribute(dir: &Path, attribute: &str) -> Option<String> {
    // Some attributes (e.g. `speed` on a down link) exist but fail to read.
    fs::read_to_string(dir.join(attribute)).ok().map(|value| value.trim().to_string())
}

fn read_interface(dir: &Path) -> InterfaceInfo {
    let is_up = match read_attribute(dir, "flags") {
        Some(flags) => u32::from_str_radix(flags.trim_start_matches("0x"), 16)
            .map(|bits| bits & IFF_UP != 0)
            .unwrap_or(false),
        None => read_attribute(dir, "operstate").is_some_and(|state| state == "up"),
    };

    // Virtual and down links report -1 or nothing.
    let speed = read_attribute(dir, "speed")
        .and_then(|speed| speed.parse::<i64>().ok())
        .filter(|speed| *speed > 0)
        .unwrap_or(0);

    let duplex = read_attribute(dir, "duplex")
        .and_then(|duplex| duplex.parse::<Duplex>().ok())
        .unwrap_or(Duplex::Unknown);

    let mtu = read_attribute(dir, "mtu")
        .and_then(|mtu| mtu.parse::<u32>().ok())
        .unwrap_or(0);

    InterfaceInfo { is_up, speed: format!("{speed} Mbps"), duplex, mtu }
}
