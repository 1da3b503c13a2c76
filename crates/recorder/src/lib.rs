//! # Nebula Recorder
//!
//! The execution-tracking recorder (C7, §4.6): persists executions,
//! steps, logs, and audit entries, and answers the admin HTTP layer's
//! filtered listings and aggregations. [`ExecutionRecorder`] also
//! implements `nebula_execution::RecorderPort`, so it plugs directly into
//! the pipeline executor (C6) as the concrete recorder the server wires
//! at post-start (§4.3 "Hot reload").

mod execution;
mod log;
mod step;
mod store;

pub use execution::{ExecutionFilter, ExecutionRecord, ExecutionStatus};
pub use log::{AuditEntry, LineSink, LogEntry, LogFilter, LogLevel, LogWriter};
pub use step::{ExecutionStep, StepStatus};
pub use store::ExecutionRecorder;
