//! # Nebula Telemetry
//!
//! The observability reporter (part of C12, §4.11): batches recorded
//! executions and logs to an admin base URL over HTTP and sends periodic
//! instance heartbeats (§11).

mod reporter;

pub use reporter::{Reporter, ReporterConfig};
