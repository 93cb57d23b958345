// src/core/report.rs

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::core::models::{InterfaceInfo, NetworkDiagnostics, ProbeName, ProbeOutcome};

/// The merged result of one orchestration run: one outcome per enabled probe.
///
/// Serializes as a JSON object keyed by probe name, in name order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Report {
    entries: BTreeMap<ProbeName, ProbeOutcome>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: ProbeName) -> Option<&ProbeOutcome> {
        self.entries.get(&name)
    }

    pub fn contains(&self, name: ProbeName) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn keys(&self) -> impl Iterator<Item = ProbeName> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProbeName, &ProbeOutcome)> {
        self.entries.iter().map(|(name, outcome)| (*name, outcome))
    }

    /// Names of the probes that ended in failure.
    pub fn failures(&self) -> impl Iterator<Item = ProbeName> + '_ {
        self.iter().filter(|(_, outcome)| outcome.is_failure()).map(|(name, _)| name)
    }
}

/// Collects probe outcomes; the [`Report`] only exists once [`ReportBuilder::finish`] runs.
#[derive(Debug)]
pub struct ReportBuilder {
    slots: Vec<(ProbeName, ProbeOutcome)>,
}

impl ReportBuilder {
    pub fn with_capacity(probes: usize) -> Self {
        Self { slots: Vec::with_capacity(probes) }
    }

    /// Fills the slot for `name`. Each slot is written once; later writes are dropped.
    pub fn record(&mut self, name: ProbeName, outcome: ProbeOutcome) {
        if self.slots.iter().any(|(existing, _)| *existing == name) {
            warn!(probe = %name, "Outcome already recorded, ignoring duplicate.");
            return;
        }
        self.slots.push((name, outcome));
    }

    pub fn finish(self) -> Report {
        Report { entries: self.slots.into_iter().collect() }
    }
}

/// Groups interface state and the two ping results under the diagnostics entry.
pub fn diagnostics_entry(
    network_info: BTreeMap<String, InterfaceInfo>,
    ping_google: String,
    ping_cloudflare: String,
) -> NetworkDiagnostics {
    NetworkDiagnostics { network_info, ping_google, ping_cloudflare }
}
