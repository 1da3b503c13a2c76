//! Workflow CRUD and deployment routes (§6 "Workflows").

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use nebula_core::WorkflowId;
use nebula_deploy::Plan as DeploymentPlan;
use nebula_storage::WorkflowRecord;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::state::ApiState;

#[derive(Deserialize)]
pub struct CreateWorkflowRequest {
    pub key: String,
    pub yaml: String,
}

#[derive(Serialize)]
pub struct WorkflowResponse {
    pub id: WorkflowId,
    pub key: String,
    pub version: u32,
    pub yaml: String,
}

impl From<WorkflowRecord> for WorkflowResponse {
    fn from(record: WorkflowRecord) -> Self {
        Self { id: record.id, key: record.key, version: record.version, yaml: record.yaml }
    }
}

/// `GET /workflows` (§6).
pub async fn list_workflows(State(state): State<ApiState>) -> Json<Vec<WorkflowResponse>> {
    Json(state.store.workflows.list().into_iter().map(WorkflowResponse::from).collect())
}

/// `POST /workflows` — validates the YAML body is at least well-formed
/// (§3 invariants self-contained within one document) before persisting.
pub async fn create_workflow(State(state): State<ApiState>, Json(req): Json<CreateWorkflowRequest>) -> Result<(StatusCode, Json<WorkflowResponse>), ApiError> {
    nebula_config::parse_yaml(&req.yaml)?;
    let id = WorkflowId::v4();
    let record = state.store.workflows.upsert(id, req.key, req.yaml, Utc::now());
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `GET /workflows/{id}`.
pub async fn get_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<Json<WorkflowResponse>, ApiError> {
    let record = state.store.workflows.get(id).ok_or_else(|| ApiError::not_found("workflow"))?;
    Ok(Json(record.into()))
}

/// `PUT /workflows/{id}` — replaces the YAML body, bumping the version.
pub async fn update_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>, Json(req): Json<CreateWorkflowRequest>) -> Result<Json<WorkflowResponse>, ApiError> {
    state.store.workflows.get(id).ok_or_else(|| ApiError::not_found("workflow"))?;
    nebula_config::parse_yaml(&req.yaml)?;
    let record = state.store.workflows.upsert(id, req.key, req.yaml, Utc::now());
    Ok(Json(record.into()))
}

/// `DELETE /workflows/{id}`.
pub async fn delete_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>) -> Result<StatusCode, ApiError> {
    if state.store.workflows.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("workflow"))
    }
}

#[derive(Deserialize)]
pub struct DeployRequest {
    pub strategy: String,
    pub from_version: u32,
    pub to_version: u32,
    #[serde(default)]
    pub rollback_on_failure: bool,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Serialize)]
pub struct DeployResponse {
    pub status: &'static str,
    pub rolled_back: bool,
    pub canary_percent: Option<u8>,
    pub stable_percent: Option<u8>,
    pub active_version: Option<u32>,
    pub message: Option<String>,
}

/// `POST /workflows/{id}/deploy` (§4.8). Looks the strategy up by name in
/// the deployment strategy registry (C9), validates the config, executes
/// the plan, and — per §7 "Deployment errors" — attempts an automatic
/// rollback when `rollback_on_failure` is set and the execute call fails.
pub async fn deploy_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>, Json(req): Json<DeployRequest>) -> Result<Json<DeployResponse>, ApiError> {
    state.store.workflows.get(id).ok_or_else(|| ApiError::not_found("workflow"))?;
    let strategy = state.deployments.get(&req.strategy)?;
    strategy.validate(&req.config)?;

    let plan = DeploymentPlan { workflow_id: id, from_version: req.from_version, to_version: req.to_version, rollback_on_failure: req.rollback_on_failure };
    let result = match strategy.execute(CancellationToken::new(), plan).await {
        Ok(result) => result,
        Err(err) if req.rollback_on_failure => {
            tracing::warn!(workflow_id = %id, error = %err, "deployment failed, attempting rollback");
            strategy.rollback(id).await?
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Json(DeployResponse {
        status: match result.status {
            nebula_deploy::DeploymentStatus::Success => "success",
            nebula_deploy::DeploymentStatus::RolledBack => "rolled_back",
            nebula_deploy::DeploymentStatus::Failed => "failed",
        },
        rolled_back: result.rolled_back,
        canary_percent: result.canary_percent,
        stable_percent: result.stable_percent,
        active_version: result.active_version,
        message: result.message,
    }))
}

#[derive(Deserialize)]
pub struct TriggerRequest {
    pub trigger_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `POST /workflows/{id}/trigger` — not named in §6's representative
/// endpoint list but required to exercise the data flow §2 describes
/// ("external request ... triggers a workflow on C4"); runs the quota
/// enforcement middleware ([`crate::billing::enforce_quota`]) and, on
/// success, records one execution against the tenant's usage meter.
pub async fn trigger_workflow(State(state): State<ApiState>, Path(id): Path<WorkflowId>, Json(req): Json<TriggerRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state.store.workflows.get(id).ok_or_else(|| ApiError::not_found("workflow"))?;
    let engine: Arc<nebula_engine::Engine> = state.manager.current().ok_or_else(|| ApiError::ServiceUnavailable { feature: "engine".to_owned() })?;
    let handler = engine.workflow_handler(&record.key).ok_or_else(|| ApiError::not_found("workflow handler"))?;
    let output = handler.handle(&req.trigger_type, req.data).await.map_err(|err| ApiError::Internal { message: err.to_string() })?;
    Ok(Json(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_billing::TenantUsageMeter;
    use nebula_deploy::DeploymentStrategyRegistry;
    use nebula_engine::{EngineRegistries, Manager};
    use nebula_permissions::PermissionService;
    use nebula_recorder::ExecutionRecorder;
    use nebula_router::{CrossWorkflowRouter, InMemoryLinkStore};
    use nebula_storage::V1Store;

    fn state() -> ApiState {
        ApiState {
            store: Arc::new(V1Store::new()),
            recorder: Arc::new(ExecutionRecorder::new()),
            meter: Arc::new(TenantUsageMeter::new()),
            permissions: Arc::new(PermissionService::new()),
            deployments: Arc::new(DeploymentStrategyRegistry::new()),
            router: Arc::new(CrossWorkflowRouter::new(Arc::new(InMemoryLinkStore::new()))),
            manager: Arc::new(Manager::new(Arc::new(EngineRegistries::new()))),
            jwt: crate::auth::JwtService::new("test-secret"),
            instances: Arc::new(dashmap::DashMap::new()),
        }
    }

    #[tokio::test]
    async fn create_then_get_workflow_round_trips() {
        let state = state();
        let (status, Json(created)) = create_workflow(State(state.clone()), Json(CreateWorkflowRequest { key: "order-pipeline".to_owned(), yaml: "modules: []\n".to_owned() })).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(fetched) = get_workflow(State(state), Path(created.id)).await.unwrap();
        assert_eq!(fetched.key, "order-pipeline");
        assert_eq!(fetched.version, 1);
    }

    #[tokio::test]
    async fn malformed_yaml_is_rejected_before_persisting() {
        let state = state();
        let err = create_workflow(State(state.clone()), Json(CreateWorkflowRequest { key: "bad".to_owned(), yaml: "not: [valid yaml".to_owned() })).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
        assert!(state.store.workflows.list().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_unknown_workflow_is_a_404() {
        let state = state();
        let err = delete_workflow(State(state), Path(WorkflowId::v4())).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn deploy_against_an_unknown_strategy_surfaces_the_typed_error() {
        let state = state();
        let (_, Json(created)) = create_workflow(State(state.clone()), Json(CreateWorkflowRequest { key: "wf".to_owned(), yaml: "modules: []\n".to_owned() })).await.unwrap();
        let err = deploy_workflow(
            State(state),
            Path(created.id),
            Json(DeployRequest { strategy: "missing".to_owned(), from_version: 1, to_version: 2, rollback_on_failure: false, config: serde_json::Value::Null }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }
}
