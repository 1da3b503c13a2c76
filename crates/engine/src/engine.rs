//! `BuildFromConfig` and the running graph it produces (C4, §4.3).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_app::{Application, Service};
use nebula_config::EngineConfig;
use nebula_error::{ConfigError, Result};
use nebula_router::EngineHandle;
use serde_json::Value;

use crate::handler::WorkflowHandler;
use crate::registries::EngineRegistries;

/// A running graph built from one config document: every module
/// instantiated and registered with the service lifecycle coordinator
/// (C3), every workflow resolved to a runnable handler, every trigger
/// linked to the workflow it fires.
///
/// Immutable once built — a config change produces a new `Engine`
/// entirely; [`crate::Manager`] is what replaces one `Engine` with
/// another across a hot reload.
pub struct Engine {
    application: Application,
    workflows: HashMap<String, Arc<dyn WorkflowHandler>>,
    handles: DashMap<String, Arc<dyn EngineHandle>>,
}

impl Engine {
    /// `BuildFromConfig(cfg)` (§4.3):
    ///
    /// 1. Instantiate each module via its factory and register it with
    ///    the application under its `name`.
    /// 2. Resolve each workflow's handler from its body.
    /// 3. Instantiate each trigger and link it to the workflow it names.
    ///
    /// Every reference is validated as it is resolved; the first
    /// unresolvable one discards everything built so far and returns the
    /// [`ConfigError`] naming the offending descriptor — nothing here
    /// mutates state outside the `services`/`workflows` vectors being
    /// assembled, so "discard partial state" falls out of simply not
    /// returning the half-built `Engine`.
    pub fn build_from_config(cfg: &EngineConfig, registries: &EngineRegistries) -> Result<Self> {
        let mut services: Vec<Arc<dyn Service>> = Vec::with_capacity(cfg.modules.len() + cfg.triggers.len());

        for module in &cfg.modules {
            let factory = registries.modules.resolve(&module.name, &module.type_name)?;
            services.push(factory.build(&module.name, &module.config)?);
        }

        let mut workflows: HashMap<String, Arc<dyn WorkflowHandler>> = HashMap::with_capacity(cfg.workflows.len());
        for workflow in &cfg.workflows {
            let factory = registries.workflow_handlers.resolve(&workflow.key, &workflow.handler_type)?;
            workflows.insert(workflow.key.clone(), factory.build(workflow)?);
        }

        for trigger in &cfg.triggers {
            let factory = registries.triggers.resolve(&trigger.key, &trigger.type_name)?;
            let workflow_key = trigger.module.as_deref().ok_or_else(|| ConfigError::UnresolvedReference {
                from: trigger.key.clone(),
                to: "<no workflow linked>".to_owned(),
            })?;
            let handler = workflows.get(workflow_key).cloned().ok_or_else(|| ConfigError::UnresolvedReference {
                from: trigger.key.clone(),
                to: workflow_key.to_owned(),
            })?;
            services.push(factory.build(trigger, handler)?);
        }

        let application = Application::build(services)?;
        Ok(Self { application, workflows, handles: DashMap::new() })
    }

    /// `Start`: delegate to C3 (`Init` then `Start`, in dependency order).
    pub async fn start(&self) -> Result<()> {
        self.application.init().await?;
        self.application.start().await?;
        Ok(())
    }

    /// `Stop`: delegate to C3 (reverse dependency order; individual
    /// failures are logged, not propagated).
    pub async fn stop(&self) {
        self.application.stop().await;
    }

    #[must_use]
    pub fn application(&self) -> &Application {
        &self.application
    }

    /// Make a post-start service (the execution recorder, the v1 store,
    /// …) visible to this engine's `get_service` lookups without giving
    /// it a place in the `Init`/`Start`/`Stop` order (§4.3 step 3).
    pub fn register_post_start_service(&self, name: &str, service: Arc<dyn Service>) {
        self.application.register_external(name, service);
    }

    #[must_use]
    pub fn workflow_handler(&self, key: &str) -> Option<Arc<dyn WorkflowHandler>> {
        self.workflows.get(key).cloned()
    }

    #[must_use]
    pub fn workflow_keys(&self) -> Vec<String> {
        self.workflows.keys().cloned().collect()
    }

    /// The [`EngineHandle`] C8's router delivers routed events to for the
    /// workflow named `key`, or `None` if no such workflow is configured.
    /// Adapters are cached so repeated lookups don't reallocate.
    #[must_use]
    pub fn engine_handle(&self, key: &str) -> Option<Arc<dyn EngineHandle>> {
        if let Some(existing) = self.handles.get(key) {
            return Some(existing.clone());
        }
        let handler = self.workflows.get(key)?.clone();
        let handle: Arc<dyn EngineHandle> = Arc::new(WorkflowEngineHandle { workflow_key: key.to_owned(), handler });
        self.handles.insert(key.to_owned(), handle.clone());
        Some(handle)
    }
}

/// Adapts one workflow's [`WorkflowHandler`] to the narrow capability C8's
/// router needs to deliver a routed event (§4.7). The router always
/// passes `"pipeline"` as the `handler_type` argument today, so it is
/// ignored here; `action` is the routed event type.
struct WorkflowEngineHandle {
    workflow_key: String,
    handler: Arc<dyn WorkflowHandler>,
}

#[async_trait]
impl EngineHandle for WorkflowEngineHandle {
    async fn trigger_workflow(&self, _handler_type: &str, action: &str, data: Value) -> Result<(), nebula_error::RoutingError> {
        self.handler.handle(action, data).await.map(|_| ()).map_err(|err| nebula_error::RoutingError::HandlerFailed {
            workflow_key: self.workflow_key.clone(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{PipelineHandlerFactory, SwappableRecorder};
    use crate::module::ModuleFactory;
    use nebula_config::{ModuleDescriptor, PipelineStep, TriggerDescriptor, WorkflowDescriptor};
    use nebula_execution::register_builtins;
    use nebula_registry::StepRegistry;
    use std::any::Any;

    struct RecordingService {
        name: &'static str,
    }

    #[async_trait]
    impl Service for RecordingService {
        fn name(&self) -> &str {
            self.name
        }

        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    struct RecordingModuleFactory;

    impl ModuleFactory for RecordingModuleFactory {
        fn build(&self, name: &str, _config: &Value) -> Result<Arc<dyn Service>, ConfigError> {
            Ok(Arc::new(RecordingService { name: Box::leak(name.to_owned().into_boxed_str()) }))
        }
    }

    struct NoopTriggerFactory;

    impl crate::trigger::TriggerFactory for NoopTriggerFactory {
        fn build(&self, descriptor: &TriggerDescriptor, _workflow: Arc<dyn WorkflowHandler>) -> Result<Arc<dyn Service>, ConfigError> {
            Ok(Arc::new(RecordingService { name: Box::leak(descriptor.key.clone().into_boxed_str()) }))
        }
    }

    fn registries() -> EngineRegistries {
        let registries = EngineRegistries::new();
        registries.modules.register("memory_queue", Arc::new(RecordingModuleFactory) as Arc<dyn ModuleFactory>);
        registries.triggers.register("http", Arc::new(NoopTriggerFactory) as Arc<dyn crate::trigger::TriggerFactory>);
        let steps = StepRegistry::new();
        register_builtins(&steps);
        registries
            .workflow_handlers
            .register("pipeline", Arc::new(PipelineHandlerFactory::new(Arc::new(steps), Arc::new(SwappableRecorder::new()))) as Arc<dyn WorkflowHandlerFactory>);
        registries
    }

    fn config() -> EngineConfig {
        EngineConfig {
            modules: vec![ModuleDescriptor { name: "queue".to_owned(), type_name: "memory_queue".to_owned(), config: Value::Null, depends_on: vec![] }],
            workflows: vec![WorkflowDescriptor {
                key: "order-flow".to_owned(),
                handler_type: "pipeline".to_owned(),
                steps: vec![PipelineStep { name: "finish".to_owned(), type_name: "noop".to_owned(), config: Value::Null, next: None, skip_on_error: false }],
                entry: Some("finish".to_owned()),
                body: Value::Null,
            }],
            triggers: vec![TriggerDescriptor { key: "order-webhook".to_owned(), type_name: "http".to_owned(), module: Some("order-flow".to_owned()), body: Value::Null }],
        }
    }

    #[tokio::test]
    async fn builds_modules_workflows_and_triggers_from_config() {
        let registries = registries();
        let engine = Engine::build_from_config(&config(), &registries).unwrap();
        engine.start().await.unwrap();
        assert!(engine.workflow_handler("order-flow").is_some());
        assert!(engine.application().get_service::<RecordingService>("queue").is_ok());
        assert!(engine.application().get_service::<RecordingService>("order-webhook").is_ok());
        engine.stop().await;
    }

    #[test]
    fn unknown_module_type_is_a_typed_build_error_naming_the_module() {
        let registries = registries();
        let mut cfg = config();
        cfg.modules[0].type_name = "does_not_exist".to_owned();
        let err = Engine::build_from_config(&cfg, &registries).unwrap_err();
        assert!(matches!(err, nebula_error::Error::Config(ConfigError::UnknownModuleType { .. })));
    }

    #[test]
    fn trigger_naming_an_unknown_workflow_is_rejected() {
        let registries = registries();
        let mut cfg = config();
        cfg.triggers[0].module = Some("missing-workflow".to_owned());
        let err = Engine::build_from_config(&cfg, &registries).unwrap_err();
        assert!(matches!(err, nebula_error::Error::Config(ConfigError::UnresolvedReference { .. })));
    }

    #[tokio::test]
    async fn engine_handle_delivers_to_the_named_workflow() {
        let registries = registries();
        let engine = Engine::build_from_config(&config(), &registries).unwrap();
        let handle = engine.engine_handle("order-flow").unwrap();
        handle.trigger_workflow("pipeline", "order.created", Value::Null).await.unwrap();
        assert!(engine.engine_handle("missing").is_none());
    }
}
