//! # Nebula Deploy
//!
//! The deployment strategy engine (C9, §4.8): blue/green, canary, and
//! rolling rollout strategies behind a common [`DeploymentStrategy`]
//! trait, indexed by name in a [`DeploymentStrategyRegistry`].

mod blue_green;
mod canary;
mod registry;
mod rolling;
mod strategy;

pub use blue_green::{BlueGreenStrategy, Env};
pub use canary::{CanaryConfig, CanaryStrategy};
pub use registry::DeploymentStrategyRegistry;
pub use rolling::{RollingConfig, RollingStrategy};
pub use strategy::{AlwaysHealthy, DeploymentResult, DeploymentStatus, DeploymentStrategy, HealthCheck, Plan};
