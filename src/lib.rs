// src/lib.rs

//! Concurrent network-diagnostic probes merged into a single structured report.
//!
//! ```no_run
//! use netprobe::{config::AppConfig, Orchestrator, ProbeRequest, Toolbox};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let toolbox = Toolbox::system(&config)?;
//! let report = Orchestrator::new(config, toolbox).run(&ProbeRequest::default()).await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod logging;

pub use crate::core::error::ProbeError;
pub use crate::core::models::{ProbeName, ProbeOutcome, ProbePayload, ProbeRequest};
pub use crate::core::orchestrator::Orchestrator;
pub use crate::core::report::Report;
pub use crate::core::tools::Toolbox;
