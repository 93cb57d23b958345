// src/core/mod.rs

/// Data structures shared across the crate: the probe request, every probe's
/// result shape and the outcome wrapper that carries per-probe failures.
pub mod models;

/// The error type raised inside probes before it is contained as data.
pub mod error;

/// Line-oriented parsers for throughput, packet-loss and host-discovery output.
pub mod parser;

/// Collaborator traits for subprocesses, OS state and third-party clients,
/// plus their production adapters.
pub mod tools;

/// The five probes and the factory building them from a request.
pub mod probes;

/// Fan-out/fan-in execution of the enabled probes.
pub mod orchestrator;

/// Assembly of probe outcomes into the final, name-ordered report.
pub mod report;
