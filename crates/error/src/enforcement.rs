//! Tenant enforcement errors (§7 "Enforcement errors", §4.9).

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnforcementError {
    #[error("unknown plan `{plan_id}`")]
    UnknownPlan { plan_id: String },

    #[error("execution limit exceeded, {remaining} remaining")]
    LimitExceeded { remaining: i64 },
}
