//! Execution query routes (§6 "Executions", §4.6 `ListExecutions`/
//! `GetExecution`/`ListSteps`, log `Query`).

use axum::extract::{Path, Query, State};
use axum::Json;
use nebula_core::ExecutionId;
use nebula_recorder::{ExecutionFilter, ExecutionRecord, ExecutionStatus, ExecutionStep, LogEntry, LogFilter, LogLevel};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::ApiState;

#[derive(Deserialize)]
pub struct ListExecutionsQuery {
    pub workflow_id: Option<nebula_core::WorkflowId>,
    pub status: Option<ExecutionStatus>,
}

/// `GET /executions?workflow_id=&status=` (§4.6, §4.6 invariant:
/// most-recent-first by default).
pub async fn list_executions(State(state): State<ApiState>, Query(query): Query<ListExecutionsQuery>) -> Json<Vec<ExecutionRecord>> {
    let filter = ExecutionFilter { workflow_id: query.workflow_id, status: query.status, oldest_first: false };
    Json(state.recorder.list_executions(&filter))
}

/// `GET /executions/{id}` (P1: terminal executions carry `completedAt`
/// and a non-negative `durationMs`).
pub async fn get_execution(State(state): State<ApiState>, Path(id): Path<ExecutionId>) -> Result<Json<ExecutionRecord>, ApiError> {
    state.recorder.get_execution(id).map(Json).ok_or_else(|| ApiError::not_found("execution"))
}

/// `GET /executions/{id}/steps` (P2: insertion-ordered by `sequenceNum`,
/// no gaps).
pub async fn list_steps(State(state): State<ApiState>, Path(id): Path<ExecutionId>) -> Json<Vec<ExecutionStep>> {
    Json(state.recorder.list_steps(id))
}

#[derive(Deserialize)]
pub struct ListLogsQuery {
    pub level: Option<LogLevel>,
}

/// `GET /executions/{id}/logs`.
pub async fn list_logs(State(state): State<ApiState>, Path(id): Path<ExecutionId>, Query(query): Query<ListLogsQuery>) -> Json<Vec<LogEntry>> {
    let filter = LogFilter { execution_id: Some(id), level: query.level, ..Default::default() };
    Json(state.recorder.query_logs(&filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::WorkflowId;
    use nebula_recorder::ExecutionRecorder;
    use std::sync::Arc;

    #[tokio::test]
    async fn get_execution_404s_for_an_unknown_id() {
        let recorder = Arc::new(ExecutionRecorder::new());
        let state = crate::state::ApiState {
            store: Arc::new(nebula_storage::V1Store::new()),
            recorder,
            meter: Arc::new(nebula_billing::TenantUsageMeter::new()),
            permissions: Arc::new(nebula_permissions::PermissionService::new()),
            deployments: Arc::new(nebula_deploy::DeploymentStrategyRegistry::new()),
            router: Arc::new(nebula_router::CrossWorkflowRouter::new(Arc::new(nebula_router::InMemoryLinkStore::new()))),
            manager: Arc::new(nebula_engine::Manager::new(Arc::new(nebula_engine::EngineRegistries::new()))),
            jwt: crate::auth::JwtService::new("test-secret"),
            instances: Arc::new(dashmap::DashMap::new()),
        };
        let err = get_execution(State(state), Path(ExecutionId::v4())).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn scenario_3_pipeline_execution_listed_end_to_end() {
        let recorder = Arc::new(ExecutionRecorder::new());
        let workflow_id = WorkflowId::v4();
        let execution_id = recorder.start_execution(workflow_id, "manual", serde_json::json!({"order_id": "ORD-001", "total": 99.99}));
        for (seq, name) in [(0, "validate"), (1, "transform"), (2, "persist")] {
            recorder.push_step(
                execution_id,
                nebula_recorder::ExecutionStep {
                    execution_id,
                    sequence_num: seq,
                    step_name: name.to_owned(),
                    step_type: "noop".to_owned(),
                    status: nebula_recorder::StepStatus::Completed,
                    started_at: None,
                    completed_at: None,
                },
            );
        }
        recorder.complete_execution(execution_id, serde_json::json!({"order_id": "ORD-001", "status": "validated"}));

        let state = crate::state::ApiState {
            store: Arc::new(nebula_storage::V1Store::new()),
            recorder,
            meter: Arc::new(nebula_billing::TenantUsageMeter::new()),
            permissions: Arc::new(nebula_permissions::PermissionService::new()),
            deployments: Arc::new(nebula_deploy::DeploymentStrategyRegistry::new()),
            router: Arc::new(nebula_router::CrossWorkflowRouter::new(Arc::new(nebula_router::InMemoryLinkStore::new()))),
            manager: Arc::new(nebula_engine::Manager::new(Arc::new(nebula_engine::EngineRegistries::new()))),
            jwt: crate::auth::JwtService::new("test-secret"),
            instances: Arc::new(dashmap::DashMap::new()),
        };

        let Json(execution) = get_execution(State(state.clone()), Path(execution_id)).await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert!(execution.duration_ms.unwrap() >= 0);

        let Json(steps) = list_steps(State(state), Path(execution_id)).await;
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2].step_name, "persist");
    }
}
