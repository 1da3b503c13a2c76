//! The shared state every route handler reads from.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_billing::TenantUsageMeter;
use nebula_deploy::DeploymentStrategyRegistry;
use nebula_engine::Manager;
use nebula_permissions::PermissionService;
use nebula_recorder::ExecutionRecorder;
use nebula_router::CrossWorkflowRouter;
use nebula_storage::V1Store;

use crate::auth::JwtService;

/// Last-seen heartbeat per remote worker instance id (§6 "`POST
/// /admin/instances/register|heartbeat`", §11 "Reporter heartbeat") —
/// what lets an admin console tell a live engine replica from a stale
/// one.
pub type InstanceRegistry = DashMap<String, DateTime<Utc>>;

/// Bundles the post-start services and registries the admin HTTP layer
/// needs (C12). Cloning is cheap — every field is an `Arc` or a
/// `Clone`-cheap service handle, matching axum's `State` extractor
/// requiring `Clone`.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<V1Store>,
    pub recorder: Arc<ExecutionRecorder>,
    pub meter: Arc<TenantUsageMeter>,
    pub permissions: Arc<PermissionService>,
    pub deployments: Arc<DeploymentStrategyRegistry>,
    pub router: Arc<CrossWorkflowRouter>,
    pub manager: Arc<Manager>,
    pub jwt: JwtService,
    pub instances: Arc<InstanceRegistry>,
}
