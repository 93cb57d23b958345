// src/core/orchestrator.rs

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::AppConfig;
use crate::core::error::ProbeError;
use crate::core::models::{ProbeName, ProbeOutcome, ProbeRequest};
use crate::core::probes::{build_probes, Probe};
use crate::core::report::{Report, ReportBuilder};
use crate::core::tools::Toolbox;

/// Runs the enabled probes of a request concurrently and merges their outcomes.
pub struct Orchestrator {
    config: Arc<AppConfig>,
    toolbox: Toolbox,
}

impl Orchestrator {
    pub fn new(config: AppConfig, toolbox: Toolbox) -> Self {
        Self { config: Arc::new(config), toolbox }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs every probe enabled in `request` and waits for all of them.
    ///
    /// All probes are spawned before any is awaited. A probe that fails, panics or
    /// exceeds the configured timeout only affects its own entry; the report always
    /// holds exactly one outcome per enabled probe.
    pub async fn run(&self, request: &ProbeRequest) -> Report {
        let probes = build_probes(request, &self.config, &self.toolbox);
        info!(probes = ?request.enabled_probes(), "Initiating selected tests.");
        self.run_probes(probes).await
    }

    /// Fans out an explicit set of probes. Probe names are expected to be unique.
    pub async fn run_probes(&self, probes: Vec<Arc<dyn Probe>>) -> Report {
        let timeout = self.config.probe_timeout();
        let started = Instant::now();

        let handles: Vec<(ProbeName, JoinHandle<ProbeOutcome>)> = probes
            .into_iter()
            .map(|probe| {
                let name = probe.name();
                let span = info_span!("probe", name = %name);
                (name, tokio::spawn(run_contained(probe, timeout).instrument(span)))
            })
            .collect();

        let mut builder = ReportBuilder::with_capacity(handles.len());
        for (name, handle) in handles {
            let outcome = handle.await.unwrap_or_else(|e| {
                error!(probe = %name, error = %e, "Probe task panicked!");
                ProbeOutcome::failure(name, ProbeError::TaskFailed(e.to_string()).to_string())
            });
            builder.record(name, outcome);
        }

        let report = builder.finish();
        info!(
            probes = report.len(),
            failed = report.failures().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Selected tests completed."
        );
        report
    }
}

/// Runs one probe and converts any error into a failure outcome for it.
async fn run_contained(probe: Arc<dyn Probe>, timeout: Option<Duration>) -> ProbeOutcome {
    let name = probe.name();
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, probe.run())
            .await
            .unwrap_or(Err(ProbeError::Timeout(limit))),
        None => probe.run().await,
    };

    match result {
        Ok(payload) => ProbeOutcome::Success(payload),
        Err(e) => {
            warn!(probe = %name, error = %e, "Probe failed.");
            ProbeOutcome::failure(name, e.to_string())
        }
    }
}
