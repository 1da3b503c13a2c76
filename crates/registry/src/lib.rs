//! # Nebula Registry
//!
//! Keyed factory registries (C2): modules, pipeline steps, triggers,
//! workflow handlers, and deployment strategies are all looked up by a
//! string type key at config-build time. Registration is idempotent —
//! registering the same key twice replaces the earlier factory rather
//! than erroring, so a plugin can be reloaded without restarting the
//! process around it.

mod factory;

pub use factory::FactoryRegistry;

use nebula_error::{ConfigError, DeploymentError};

/// Resolves module `type` keys to factories (§3 "Module descriptor").
#[derive(Debug)]
pub struct ModuleRegistry<F> {
    inner: FactoryRegistry<F>,
}

impl<F: Clone> ModuleRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: FactoryRegistry::new() }
    }

    pub fn register(&self, type_name: impl Into<String>, factory: F) {
        self.inner.register(type_name, factory);
    }

    pub fn resolve(&self, module_name: &str, type_name: &str) -> Result<F, ConfigError> {
        self.inner.get(type_name).ok_or_else(|| ConfigError::UnknownModuleType {
            module_name: module_name.to_owned(),
            type_name: type_name.to_owned(),
        })
    }
}

impl<F: Clone> Default for ModuleRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves pipeline step `type` keys to factories (§3 "Pipeline step").
#[derive(Debug)]
pub struct StepRegistry<F> {
    inner: FactoryRegistry<F>,
}

impl<F: Clone> StepRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: FactoryRegistry::new() }
    }

    pub fn register(&self, type_name: impl Into<String>, factory: F) {
        self.inner.register(type_name, factory);
    }

    pub fn resolve(&self, step_name: &str, type_name: &str) -> Result<F, ConfigError> {
        self.inner.get(type_name).ok_or_else(|| ConfigError::UnknownStepType {
            step_name: step_name.to_owned(),
            type_name: type_name.to_owned(),
        })
    }
}

impl<F: Clone> Default for StepRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves trigger `type` keys to factories (§3 "Trigger descriptor").
#[derive(Debug)]
pub struct TriggerRegistry<F> {
    inner: FactoryRegistry<F>,
}

impl<F: Clone> TriggerRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: FactoryRegistry::new() }
    }

    pub fn register(&self, type_name: impl Into<String>, factory: F) {
        self.inner.register(type_name, factory);
    }

    pub fn resolve(&self, trigger_key: &str, type_name: &str) -> Result<F, ConfigError> {
        self.inner.get(type_name).ok_or_else(|| ConfigError::UnknownTriggerType {
            trigger_key: trigger_key.to_owned(),
            type_name: type_name.to_owned(),
        })
    }
}

impl<F: Clone> Default for TriggerRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves workflow `handlerType` keys to factories (§3 "Workflow
/// descriptor"). The built-in `pipeline` handler is registered under that
/// key like any other.
#[derive(Debug)]
pub struct WorkflowHandlerRegistry<F> {
    inner: FactoryRegistry<F>,
}

impl<F: Clone> WorkflowHandlerRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: FactoryRegistry::new() }
    }

    pub fn register(&self, handler_type: impl Into<String>, factory: F) {
        self.inner.register(handler_type, factory);
    }

    pub fn resolve(&self, workflow_key: &str, handler_type: &str) -> Result<F, ConfigError> {
        self.inner.get(handler_type).ok_or_else(|| ConfigError::UnknownHandlerType {
            workflow_key: workflow_key.to_owned(),
            handler_type: handler_type.to_owned(),
        })
    }
}

impl<F: Clone> Default for WorkflowHandlerRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves deployment strategy names to factories (§5 "Deployment
/// strategies"). Unlike the config-facing registries above, an unknown
/// strategy is a [`DeploymentError`], since strategies are selected at
/// deploy time rather than config-parse time.
#[derive(Debug)]
pub struct DeploymentStrategyRegistry<F> {
    inner: FactoryRegistry<F>,
}

impl<F: Clone> DeploymentStrategyRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: FactoryRegistry::new() }
    }

    pub fn register(&self, name: impl Into<String>, factory: F) {
        self.inner.register(name, factory);
    }

    pub fn resolve(&self, name: &str) -> Result<F, DeploymentError> {
        self.inner
            .get(name)
            .ok_or_else(|| DeploymentError::UnknownStrategy { name: name.to_owned() })
    }
}

impl<F: Clone> Default for DeploymentStrategyRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}
