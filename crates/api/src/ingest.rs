//! Ingest routes (§6 "Ingest (from remote workers to admin)"): the path
//! deployed engine replicas use to report execution/log/event activity
//! back to the admin plane, plus their liveness registration.
//!
//! Remote workers construct their own execution/step/log identifiers
//! before reporting them here, so ingest is modeled as a best-effort
//! replay into the local recorder (§7 "Recorder errors ... best-effort")
//! rather than a direct store-by-id write.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use nebula_core::WorkflowId;
use nebula_recorder::{ExecutionStep, LogLevel, StepStatus};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::ApiState;

#[derive(Deserialize)]
pub struct IngestStep {
    pub sequence_num: u64,
    pub step_name: String,
    pub step_type: String,
    pub status: StepStatus,
}

#[derive(Deserialize)]
pub struct IngestExecutionRequest {
    pub workflow_id: WorkflowId,
    pub trigger_type: String,
    #[serde(default)]
    pub trigger_data: serde_json::Value,
    pub status: nebula_recorder::ExecutionStatus,
    #[serde(default)]
    pub output_data: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub steps: Vec<IngestStep>,
}

/// `POST /admin/ingest/executions` — replays a remote worker's finished
/// (or in-flight) execution into the local recorder.
pub async fn ingest_execution(State(state): State<ApiState>, Json(req): Json<IngestExecutionRequest>) -> Json<serde_json::Value> {
    let execution_id = state.recorder.start_execution(req.workflow_id, &req.trigger_type, req.trigger_data);
    for (index, step) in req.steps.into_iter().enumerate() {
        state.recorder.push_step(
            execution_id,
            ExecutionStep {
                execution_id,
                sequence_num: step.sequence_num,
                step_name: step.step_name,
                step_type: step.step_type,
                status: step.status,
                started_at: None,
                completed_at: None,
            },
        );
        let _ = index;
    }
    match req.status {
        nebula_recorder::ExecutionStatus::Completed => state.recorder.complete_execution(execution_id, req.output_data.unwrap_or(serde_json::Value::Null)),
        nebula_recorder::ExecutionStatus::Failed => state.recorder.fail_execution(execution_id, req.error_message.as_deref().unwrap_or("unknown error")),
        nebula_recorder::ExecutionStatus::Cancelled => state.recorder.cancel_execution(execution_id),
        nebula_recorder::ExecutionStatus::Running => {}
    }
    Json(crate::error::message("ingested"))
}

#[derive(Deserialize)]
pub struct IngestLogRequest {
    pub workflow_id: WorkflowId,
    #[serde(default)]
    pub execution_id: Option<nebula_core::ExecutionId>,
    pub level: LogLevel,
    pub message: String,
}

/// `POST /admin/ingest/logs` — a remote worker's buffered log lines
/// (§11 "Structured log buffering"), appended one entry at a time.
pub async fn ingest_logs(State(state): State<ApiState>, Json(entries): Json<Vec<IngestLogRequest>>) -> Json<serde_json::Value> {
    use nebula_recorder::LineSink;
    for entry in entries {
        state.recorder.accept_line(entry.workflow_id, entry.execution_id, entry.level, &entry.message);
    }
    Json(crate::error::message("ingested"))
}

#[derive(Deserialize)]
pub struct IngestEventRequest {
    pub user_id: Option<nebula_core::UserId>,
    pub action: String,
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub ip_address: String,
}

/// `POST /admin/ingest/events` — remote-worker audit events (§3 "Audit
/// entry", P3: ids remain strictly increasing because they're assigned
/// here, by the local sequence generator, not by the reporting worker).
pub async fn ingest_events(State(state): State<ApiState>, Json(req): Json<IngestEventRequest>) -> Json<serde_json::Value> {
    state.recorder.record_audit(req.user_id, &req.action, &req.resource_type, req.resource_id, &req.ip_address);
    Json(crate::error::message("ingested"))
}

#[derive(Deserialize)]
pub struct RegisterInstanceRequest {
    pub instance_id: String,
}

/// `POST /admin/instances/register` — a newly-started engine replica
/// announcing itself.
pub async fn register_instance(State(state): State<ApiState>, Json(req): Json<RegisterInstanceRequest>) -> Json<serde_json::Value> {
    state.instances.insert(req.instance_id, Utc::now());
    Json(crate::error::message("registered"))
}

#[derive(Deserialize)]
pub struct HeartbeatRequest {
    pub instance_id: String,
}

/// `POST /admin/instances/heartbeat`. Heartbeating an instance that was
/// never registered just registers it — the admin plane favors staying
/// available over rejecting a replica it simply restarted without
/// knowing about.
pub async fn heartbeat_instance(State(state): State<ApiState>, Json(req): Json<HeartbeatRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    if req.instance_id.is_empty() {
        return Err(ApiError::bad_request("instance_id must not be empty"));
    }
    state.instances.insert(req.instance_id, Utc::now());
    Ok(Json(crate::error::message("ok")))
}
