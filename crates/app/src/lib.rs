//! # Nebula App
//!
//! Named service registry and lifecycle coordinator (C3). Services declare
//! what they `provide` and `require`; [`Application`] resolves a
//! dependency-ordered `Init` → `Start` sequence and its exact reverse for
//! `Stop`, the way `nebula-engine`'s module graph drives module
//! construction at a larger grain.

mod lifecycle;
mod registry;

pub use lifecycle::{Lifecycle, Service};
pub use registry::ServiceRegistry;

use std::any::Any;
use std::sync::Arc;

use nebula_error::{LifecycleError, Result};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

/// Owns the registered services and drives their lifecycle in dependency
/// order.
///
/// `requires()` edges form a DAG over service names (§4.2 invariant,
/// mirroring the module `dependsOn` DAG in `nebula-config`). `Init` and
/// `Start` run in topological order; `Stop` runs in the exact reverse of
/// whichever phase got furthest, so a partially-started application still
/// tears down cleanly.
pub struct Application {
    registry: ServiceRegistry,
    order: Vec<String>,
}

impl Application {
    /// Resolve the dependency order for `services` without running any
    /// lifecycle hooks yet. Fails with [`LifecycleError::CycleInServices`]
    /// or [`LifecycleError::DuplicateServiceName`] before anything starts.
    pub fn build(services: Vec<Arc<dyn Service>>) -> Result<Self> {
        let mut registry = ServiceRegistry::new();
        let mut graph = DiGraph::<&str, ()>::new();
        let mut index = HashMap::new();

        for svc in &services {
            let name = svc.name();
            if registry.contains(name) {
                return Err(LifecycleError::DuplicateServiceName { name: name.to_owned() }.into());
            }
            let idx = graph.add_node(name);
            index.insert(name.to_owned(), idx);
            registry.insert(name.to_owned(), Arc::clone(svc));
        }

        for svc in &services {
            let Some(&from) = index.get(svc.name()) else { continue };
            for dep in svc.requires() {
                let Some(&to) = index.get(*dep) else {
                    // Unresolved deps are reported at the config layer; here
                    // a missing node just means no ordering edge.
                    continue;
                };
                // An edge dep -> svc: dep must be ready before svc runs.
                graph.add_edge(to, from, ());
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            let name = graph[cycle.node_id()].to_owned();
            LifecycleError::CycleInServices { cycle: vec![name] }
        })?;
        let order = order.into_iter().map(|idx| graph[idx].to_owned()).collect();

        Ok(Self { registry, order })
    }

    /// Run `Init` on every service in dependency order. If any service
    /// fails, already-initialized services are stopped in reverse order
    /// and the original error is returned.
    pub async fn init(&self) -> Result<()> {
        let mut initialized = Vec::new();
        for name in &self.order {
            let svc = self.registry.get_dyn(name).expect("built from the same name set");
            if let Err(err) = svc.init().await {
                tracing::error!(service = %name, error = %err, "service init failed, rolling back");
                self.stop_in_reverse(&initialized).await;
                return Err(LifecycleError::InitFailed { service: name.clone(), reason: err.to_string() }.into());
            }
            initialized.push(name.clone());
        }
        Ok(())
    }

    /// Run `Start` on every service in dependency order. On failure, every
    /// service already started (plus everything `Init`ed) is stopped in
    /// reverse order.
    pub async fn start(&self) -> Result<()> {
        let mut started = Vec::new();
        for name in &self.order {
            let svc = self.registry.get_dyn(name).expect("built from the same name set");
            if let Err(err) = svc.start().await {
                tracing::error!(service = %name, error = %err, "service start failed, rolling back");
                self.stop_in_reverse(&started).await;
                return Err(LifecycleError::StartFailed { service: name.clone(), reason: err.to_string() }.into());
            }
            started.push(name.clone());
        }
        Ok(())
    }

    /// Stop every service in reverse dependency order. Individual stop
    /// failures are logged, not propagated — a broken shutdown must not
    /// prevent the rest of the application from tearing down (§4.2).
    pub async fn stop(&self) {
        self.stop_in_reverse(&self.order).await;
    }

    async fn stop_in_reverse(&self, names: &[String]) {
        for name in names.iter().rev() {
            let Some(svc) = self.registry.get_dyn(name) else { continue };
            if let Err(err) = svc.stop().await {
                tracing::warn!(service = %name, error = %err, "service stop failed");
            }
        }
    }

    /// Look up a registered service by name, downcast to a concrete type.
    /// Returns [`LifecycleError::ServiceNotFound`] if no such name was
    /// registered, or [`LifecycleError::ServiceTypeMismatch`] if it was
    /// registered under a different concrete type.
    pub fn get_service<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let svc = self
            .registry
            .get_dyn(name)
            .ok_or_else(|| LifecycleError::ServiceNotFound { service: name.to_owned() })?;
        let any: Arc<dyn Any + Send + Sync> = svc.as_any_arc();
        any.downcast::<T>()
            .map_err(|_| LifecycleError::ServiceTypeMismatch { service: name.to_owned() }.into())
    }

    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Register a service that already exists and is already running,
    /// making it visible to [`Application::get_service`] without running
    /// `Init`/`Start` on it or adding it to the reverse-order `Stop`
    /// sequence (§4.3 "Hot reload" step 3). The caller remains responsible
    /// for the service's own lifecycle.
    pub fn register_external(&self, name: impl Into<String>, service: Arc<dyn Service>) {
        self.registry.insert_external(name.into(), service);
    }
}
