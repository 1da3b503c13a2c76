//! # Nebula Error
//!
//! Shared error taxonomy for the Nebula workflow orchestration engine.
//!
//! Each subsystem defines its own error enum (config, lifecycle, sandbox,
//! recorder, routing, deployment, enforcement); [`Error`] is the umbrella
//! type every subsystem error converts into via `From`, so callers at the
//! edge (the HTTP layer, the CLI) only need to match on one type.

mod config;
mod deployment;
mod enforcement;
mod lifecycle;
mod recorder;
mod routing;
mod sandbox;

pub use config::ConfigError;
pub use deployment::DeploymentError;
pub use enforcement::EnforcementError;
pub use lifecycle::LifecycleError;
pub use recorder::RecorderError;
pub use routing::RoutingError;
pub use sandbox::SandboxError;

/// Umbrella error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    #[error(transparent)]
    Enforcement(#[from] EnforcementError),
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_umbrella() {
        let err: Error = ConfigError::DuplicateName {
            name: "billing".into(),
        }
        .into();
        assert!(matches!(err, Error::Config(ConfigError::DuplicateName { .. })));
    }

    #[test]
    fn display_passes_through_transparently() {
        let inner = ConfigError::UnresolvedReference {
            from: "trigger.webhook".into(),
            to: "module.queue".into(),
        };
        let msg = inner.to_string();
        let err: Error = inner.into();
        assert_eq!(err.to_string(), msg);
    }
}
