//! The narrow recorder interface the executor depends on (§4.5 "Recorder
//! adapter"). The server wires a concrete `nebula-recorder` implementation
//! at post-start; absent one, recording is a no-op and execution still
//! runs.

use async_trait::async_trait;
use nebula_core::{ExecutionId, WorkflowId};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub sequence_num: u64,
    pub name: String,
    pub step_type: String,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    Completed,
    Failed,
}

#[async_trait]
pub trait RecorderPort: Send + Sync {
    async fn record_start(&self, workflow_id: WorkflowId, trigger_type: &str, trigger_data: Value) -> ExecutionId;
    async fn record_step(&self, execution_id: ExecutionId, step: StepRecord);
    async fn record_complete(&self, execution_id: ExecutionId, output: Value);
    async fn record_fail(&self, execution_id: ExecutionId, error: String);
    async fn record_cancel(&self, execution_id: ExecutionId);
    fn log(&self, execution_id: ExecutionId, level: LogLevel, line: &str);
}

/// Used when the server hasn't wired a concrete recorder yet (e.g. before
/// C7's post-start registration completes a hot reload). Generates a
/// fresh id per start so the pipeline can still run end to end.
#[derive(Debug, Default)]
pub struct NoopRecorder;

#[async_trait]
impl RecorderPort for NoopRecorder {
    async fn record_start(&self, _workflow_id: WorkflowId, _trigger_type: &str, _trigger_data: Value) -> ExecutionId {
        ExecutionId::v4()
    }

    async fn record_step(&self, _execution_id: ExecutionId, _step: StepRecord) {}

    async fn record_complete(&self, _execution_id: ExecutionId, _output: Value) {}

    async fn record_fail(&self, _execution_id: ExecutionId, _error: String) {}

    async fn record_cancel(&self, _execution_id: ExecutionId) {}

    fn log(&self, _execution_id: ExecutionId, _level: LogLevel, _line: &str) {}
}
