//! Typed events emitted during execution, offered to C8 for cross-workflow
//! routing (§4.5 "Event emission").

use nebula_core::WorkflowId;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Event {
    pub workflow_id: WorkflowId,
    pub event_type: String,
    pub data: Value,
}

/// Receives every event a pipeline emits, keyed on the emitting workflow
/// id. The server wires a concrete `nebula-router` implementation;
/// without one, emission is a no-op and execution still proceeds.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

#[derive(Debug, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: Event) {}
}
