//! Lifecycle errors (§7 "Lifecycle errors", §4.2 Application/service registry).

/// Errors raised by the service registry's `Init`/`Start`/`Stop` lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("service `{name}` is already registered")]
    DuplicateServiceName { name: String },

    #[error("cycle in service dependency graph: {}", cycle.join(" -> "))]
    CycleInServices { cycle: Vec<String> },

    #[error("service `{service}` not found")]
    ServiceNotFound { service: String },

    #[error("service `{service}` has the wrong type for this handle")]
    ServiceTypeMismatch { service: String },

    #[error("init failed for service `{service}`: {reason}")]
    InitFailed { service: String, reason: String },

    #[error("start failed for service `{service}`: {reason}")]
    StartFailed { service: String, reason: String },

    #[error("stop failed for service `{service}`: {reason}")]
    StopFailed { service: String, reason: String },

    #[error("already started; use reload to replace a running application")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_services_in_order() {
        let err = LifecycleError::CycleInServices {
            cycle: vec!["db".into(), "cache".into(), "db".into()],
        };
        assert_eq!(err.to_string(), "cycle in service dependency graph: db -> cache -> db");
    }
}
