//! Indexed registry of deployment strategies by name (§3 "Five indexed
//! registries... deployment strategies by name").

use std::sync::Arc;

use dashmap::DashMap;
use nebula_error::DeploymentError;

use crate::strategy::DeploymentStrategy;

/// Idempotent by key: the last registration for a given name wins.
#[derive(Default)]
pub struct DeploymentStrategyRegistry {
    strategies: DashMap<String, Arc<dyn DeploymentStrategy>>,
}

impl DeploymentStrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, strategy: Arc<dyn DeploymentStrategy>) {
        self.strategies.insert(strategy.name().to_owned(), strategy);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn DeploymentStrategy>, DeploymentError> {
        self.strategies.get(name).map(|entry| entry.clone()).ok_or_else(|| DeploymentError::UnknownStrategy { name: name.to_owned() })
    }
}
