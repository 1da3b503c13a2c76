//! The `DeploymentStrategy` trait and shared result/plan types (C9, §4.8).

use async_trait::async_trait;
use nebula_core::WorkflowId;
use nebula_error::DeploymentError;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Outcome of an `Execute` or `Rollback` call. Mirrors the shape quoted in
/// §8 scenario 4/5 (`status`, `rolledBack`, percent splits).
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentResult {
    pub status: DeploymentStatus,
    pub rolled_back: bool,
    pub canary_percent: Option<u8>,
    pub stable_percent: Option<u8>,
    pub active_version: Option<u32>,
    pub message: Option<String>,
}

impl DeploymentResult {
    #[must_use]
    pub fn success() -> Self {
        Self { status: DeploymentStatus::Success, rolled_back: false, canary_percent: None, stable_percent: None, active_version: None, message: None }
    }

    #[must_use]
    pub fn rolled_back(canary_percent: u8, stable_percent: u8) -> Self {
        Self {
            status: DeploymentStatus::RolledBack,
            rolled_back: true,
            canary_percent: Some(canary_percent),
            stable_percent: Some(stable_percent),
            active_version: None,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self { status: DeploymentStatus::Failed, rolled_back: false, canary_percent: None, stable_percent: None, active_version: None, message: Some(message.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Success,
    RolledBack,
    Failed,
}

/// A deployment request: which workflow, which version to roll out, and
/// whether a failure should trigger an automatic rollback attempt (§7
/// "rollback_on_failure").
#[derive(Debug, Clone)]
pub struct Plan {
    pub workflow_id: WorkflowId,
    pub from_version: u32,
    pub to_version: u32,
    pub rollback_on_failure: bool,
}

/// Injected health signal consulted by strategies that progress over time
/// (canary). Returns an error rate percentage in `[0, 100]`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn error_rate(&self, workflow_id: WorkflowId, version: u32) -> f64;
}

/// Health check that always reports zero errors — the default when none
/// is injected (§4.8 "Health checks default to 0% when not injected").
pub struct AlwaysHealthy;

#[async_trait]
impl HealthCheck for AlwaysHealthy {
    async fn error_rate(&self, _workflow_id: WorkflowId, _version: u32) -> f64 {
        0.0
    }
}

/// A pluggable rollout strategy (§4.8). Implementations hold their own
/// per-workflow state and must serialize concurrent `Execute`/`Rollback`
/// calls against the same workflow.
#[async_trait]
pub trait DeploymentStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Validate a strategy-specific config blob before accepting a plan.
    fn validate(&self, config: &Value) -> Result<(), DeploymentError>;

    async fn execute(&self, cancel: CancellationToken, plan: Plan) -> Result<DeploymentResult, DeploymentError>;

    async fn rollback(&self, workflow_id: WorkflowId) -> Result<DeploymentResult, DeploymentError>;
}
