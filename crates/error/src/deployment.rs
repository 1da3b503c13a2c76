//! Deployment errors (§7 "Deployment errors", §4.8).

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeploymentError {
    #[error("invalid strategy config: {reason}")]
    InvalidStrategyConfig { reason: String },

    #[error("unknown deployment strategy `{name}`")]
    UnknownStrategy { name: String },

    #[error("no previous version to roll back to for workflow `{workflow_id}`")]
    NoPreviousVersion { workflow_id: String },

    #[error("health check failed: {reason}")]
    HealthCheckFailed { reason: String },

    #[error("deployment cancelled: {reason}")]
    Cancelled { reason: String },
}
