//! # Nebula Core
//!
//! Shared identifiers and small value types used across every Nebula
//! engine crate: strongly-typed entity ids, the `Owner > Admin > Editor >
//! Viewer` role lattice (§4.10), and the `YYYY-MM` billing period key
//! (§3 "Period").

mod id;
mod period;
mod role;

pub use id::{
    AuditId, DeploymentId, ExecutionId, LinkId, LogId, ModuleId, OrganizationId, ProjectId,
    SequenceGenerator, SequentialId, TenantId, UserId, WorkflowId,
};
pub use period::Period;
pub use role::Role;

/// Result type used across engine crates that don't need the full
/// `nebula-error` taxonomy.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors local to `nebula-core`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid period string `{0}`, expected YYYY-MM")]
    InvalidPeriod(String),
}
