//! Hot reload supervisor (§4.3 "Hot reload"; naming follows
//! `nebula_resource::Manager::reload_config`).
//!
//! [`crate::Engine`] is an immutable snapshot; `Manager` is the thing that
//! replaces one snapshot with another while keeping every reference
//! that must survive the swap — the post-start services the server
//! shell registers, and external callers already holding an
//! [`crate::Engine::engine_handle`] — intact.

use std::sync::Arc;

use nebula_app::Service;
use nebula_config::EngineConfig;
use nebula_error::Result;
use parking_lot::RwLock;

use crate::engine::Engine;
use crate::registries::EngineRegistries;

struct PostStartService {
    name: String,
    service: Arc<dyn Service>,
}

/// Drives `Start`/`Stop`/`Reload` on top of [`Engine::build_from_config`].
///
/// Holds the registries (persistent across reloads, since plugin types
/// stay registered) and the list of post-start services the server shell
/// has registered so far, replaying that list onto every freshly built
/// `Engine` before it starts.
pub struct Manager {
    registries: Arc<EngineRegistries>,
    current: RwLock<Option<Arc<Engine>>>,
    post_start: RwLock<Vec<PostStartService>>,
}

impl Manager {
    #[must_use]
    pub fn new(registries: Arc<EngineRegistries>) -> Self {
        Self { registries, current: RwLock::new(None), post_start: RwLock::new(Vec::new()) }
    }

    /// Build and start the first `Engine` from `cfg`. Fails if a manager
    /// already has a running engine — use [`Manager::reload`] to replace
    /// one.
    pub async fn start(&self, cfg: &EngineConfig) -> Result<()> {
        if self.current.read().is_some() {
            return Err(nebula_error::LifecycleError::AlreadyStarted.into());
        }
        let engine = Arc::new(Engine::build_from_config(cfg, &self.registries)?);
        for post_start in self.post_start.read().iter() {
            engine.register_post_start_service(&post_start.name, Arc::clone(&post_start.service));
        }
        engine.start().await?;
        *self.current.write() = Some(engine);
        Ok(())
    }

    /// Register a service the server shell owns across reloads (the
    /// execution recorder, the v1 store, the event store, …) so every
    /// subsequently built `Engine` — including the one produced by the
    /// next `reload` — has it registered as a post-start service
    /// (§4.3 step 3) automatically.
    pub fn register_post_start_service(&self, name: impl Into<String>, service: Arc<dyn Service>) {
        let name = name.into();
        if let Some(engine) = self.current.read().as_ref() {
            engine.register_post_start_service(&name, Arc::clone(&service));
        }
        self.post_start.write().push(PostStartService { name, service });
    }

    /// `Reload(newCfg)` (§4.3):
    ///
    /// 1. `BuildFromConfig(newCfg)` into a new `Engine` — the old one is
    ///    untouched if this fails.
    /// 2. Register every post-start service onto the new `Engine`.
    /// 3. `Start` the new `Engine`.
    /// 4. Only once the new `Engine` is actually running, `Stop` the old
    ///    one and swap it in.
    ///
    /// Steps 3 and 4 are ordered new-then-old rather than old-then-new
    /// as a literal reading of the reload sequence might suggest: the
    /// documented atomicity contract is "either the new `Application`
    /// starts and replaces the old, or the old remains active and an
    /// error is returned", and that only holds if the old engine is
    /// never stopped before the new one is confirmed running.
    pub async fn reload(&self, cfg: &EngineConfig) -> Result<()> {
        let new_engine = Arc::new(Engine::build_from_config(cfg, &self.registries)?);
        for post_start in self.post_start.read().iter() {
            new_engine.register_post_start_service(&post_start.name, Arc::clone(&post_start.service));
        }
        new_engine.start().await?;

        let old_engine = self.current.write().replace(new_engine);
        if let Some(old_engine) = old_engine {
            old_engine.stop().await;
        }
        Ok(())
    }

    /// Stop the currently running engine, if any.
    pub async fn stop(&self) {
        let engine = self.current.write().take();
        if let Some(engine) = engine {
            engine.stop().await;
        }
    }

    /// The engine currently in effect. `None` before the first
    /// [`Manager::start`].
    #[must_use]
    pub fn current(&self) -> Option<Arc<Engine>> {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{PipelineHandlerFactory, SwappableRecorder};
    use crate::module::ModuleFactory;
    use nebula_config::{ModuleDescriptor, PipelineStep, WorkflowDescriptor};
    use nebula_execution::register_builtins;
    use nebula_registry::StepRegistry;
    use serde_json::Value;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        name: &'static str,
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Service for CountingService {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self) -> nebula_error::Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> nebula_error::Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    struct CountingModuleFactory {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl ModuleFactory for CountingModuleFactory {
        fn build(&self, name: &str, _config: &Value) -> std::result::Result<Arc<dyn Service>, nebula_error::ConfigError> {
            Ok(Arc::new(CountingService {
                name: Box::leak(name.to_owned().into_boxed_str()),
                starts: Arc::clone(&self.starts),
                stops: Arc::clone(&self.stops),
            }))
        }
    }

    fn registries(starts: Arc<AtomicUsize>, stops: Arc<AtomicUsize>) -> Arc<EngineRegistries> {
        let registries = EngineRegistries::new();
        registries.modules.register("counting", Arc::new(CountingModuleFactory { starts, stops }) as Arc<dyn ModuleFactory>);
        let steps = StepRegistry::new();
        register_builtins(&steps);
        registries
            .workflow_handlers
            .register("pipeline", Arc::new(PipelineHandlerFactory::new(Arc::new(steps), Arc::new(SwappableRecorder::new()))) as Arc<dyn crate::handler::WorkflowHandlerFactory>);
        Arc::new(registries)
    }

    fn config() -> EngineConfig {
        EngineConfig {
            modules: vec![ModuleDescriptor { name: "db".to_owned(), type_name: "counting".to_owned(), config: Value::Null, depends_on: vec![] }],
            workflows: vec![WorkflowDescriptor {
                key: "flow".to_owned(),
                handler_type: "pipeline".to_owned(),
                steps: vec![PipelineStep { name: "finish".to_owned(), type_name: "noop".to_owned(), config: Value::Null, next: None, skip_on_error: false }],
                entry: Some("finish".to_owned()),
                body: Value::Null,
            }],
            triggers: vec![],
        }
    }

    #[tokio::test]
    async fn reload_starts_the_new_engine_before_stopping_the_old_one() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let manager = Manager::new(registries(starts.clone(), stops.clone()));

        manager.start(&config()).await.unwrap();
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        manager.reload(&config()).await.unwrap();
        assert_eq!(starts.load(Ordering::SeqCst), 2, "new engine started");
        assert_eq!(stops.load(Ordering::SeqCst), 1, "old engine stopped only after the new one started");
    }

    #[tokio::test]
    async fn starting_twice_without_reload_is_rejected() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let manager = Manager::new(registries(starts, stops));
        manager.start(&config()).await.unwrap();
        assert!(manager.start(&config()).await.is_err());
    }

    #[tokio::test]
    async fn post_start_services_registered_before_start_are_visible_after_reload() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let manager = Manager::new(registries(starts, stops));

        struct Marker;
        #[async_trait::async_trait]
        impl Service for Marker {
            fn name(&self) -> &str {
                "marker"
            }

            fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
                self
            }
        }

        manager.register_post_start_service("marker", Arc::new(Marker));
        manager.start(&config()).await.unwrap();
        assert!(manager.current().unwrap().application().get_service::<Marker>("marker").is_ok());

        manager.reload(&config()).await.unwrap();
        assert!(manager.current().unwrap().application().get_service::<Marker>("marker").is_ok());
    }
}
