//! Audit log route (§6 "Audit"; §3 "Audit entry", P3 strictly-increasing
//! ids).

use axum::extract::State;
use axum::Json;
use nebula_recorder::AuditEntry;

use crate::state::ApiState;

/// `GET /audit` — the full audit trail, oldest first (matches the id
/// ordering P3 guarantees).
pub async fn list_audit(State(state): State<ApiState>) -> Json<Vec<AuditEntry>> {
    Json(state.recorder.list_audit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_storage::V1Store;
    use std::sync::Arc;

    fn state() -> ApiState {
        ApiState {
            store: Arc::new(V1Store::new()),
            recorder: Arc::new(nebula_recorder::ExecutionRecorder::new()),
            meter: Arc::new(nebula_billing::TenantUsageMeter::new()),
            permissions: Arc::new(nebula_permissions::PermissionService::new()),
            deployments: Arc::new(nebula_deploy::DeploymentStrategyRegistry::new()),
            router: Arc::new(nebula_router::CrossWorkflowRouter::new(Arc::new(nebula_router::InMemoryLinkStore::new()))),
            manager: Arc::new(nebula_engine::Manager::new(Arc::new(nebula_engine::EngineRegistries::new()))),
            jwt: crate::auth::JwtService::new("test-secret"),
            instances: Arc::new(dashmap::DashMap::new()),
        }
    }

    #[tokio::test]
    async fn list_audit_reflects_recorded_entries_in_order() {
        let state = state();
        state.recorder.record_audit(None, "workflow.create", "workflow", Some("wf-1".to_owned()), "127.0.0.1");
        state.recorder.record_audit(None, "workflow.deploy", "workflow", Some("wf-1".to_owned()), "127.0.0.1");

        let Json(entries) = list_audit(State(state)).await;
        assert_eq!(entries.len(), 2);
        assert!(entries[0].id < entries[1].id);
        assert_eq!(entries[1].action, "workflow.deploy");
    }
}
