//! # Nebula Execution
//!
//! The pipeline executor (C6): walks a resolved `nebula-workflow` step
//! graph, dispatching each step to a registered [`step::StepHandler`],
//! threading a per-execution [`context::ExecutionContext`] through them,
//! and reporting progress through the narrow [`recorder::RecorderPort`]
//! the server wires to C7.

mod context;
mod error;
mod event;
mod executor;
mod recorder;
mod step;

pub use context::ExecutionContext;
pub use error::ExecutionError;
pub use event::{Event, EventSink, NoopEventSink};
pub use executor::PipelineExecutor;
pub use recorder::{LogLevel, NoopRecorder, RecorderPort, StepRecord, StepStatus};
pub use step::{register_builtins, Conditional, Noop, Publish, Set, StepHandler, Transform};
