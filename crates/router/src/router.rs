//! Cross-workflow router (C8, §4.7).

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_core::WorkflowId;
use nebula_error::RoutingError;
use parking_lot::RwLock;
use serde_json::Value;

use crate::link::CrossWorkflowLink;

/// The capability a target workflow's engine exposes to the router: the
/// ability to trigger a workflow run from a routed event (§4.7
/// `TriggerWorkflow`).
#[async_trait]
pub trait EngineHandle: Send + Sync {
    async fn trigger_workflow(&self, handler_type: &str, action: &str, data: Value) -> Result<(), RoutingError>;
}

/// Where `RefreshLinks` reloads the link set from (§4.7). A concrete
/// SQL-backed implementation is an external collaborator (§1); tests and
/// the in-process server use [`InMemoryLinkStore`].
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn list_links(&self) -> Vec<CrossWorkflowLink>;
}

/// In-memory [`LinkStore`] backing the router by default.
#[derive(Default)]
pub struct InMemoryLinkStore {
    links: RwLock<Vec<CrossWorkflowLink>>,
}

impl InMemoryLinkStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, link: CrossWorkflowLink) {
        self.links.write().push(link);
    }

    pub fn remove(&self, link_id: nebula_core::LinkId) {
        self.links.write().retain(|link| link.id != link_id);
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn list_links(&self) -> Vec<CrossWorkflowLink> {
        self.links.read().clone()
    }
}

/// Maintains an index from `(sourceWorkflowId, eventTypePattern)` to
/// target workflow ids and delivers matching events to their engines
/// (C8, §4.7).
pub struct CrossWorkflowRouter {
    store: Arc<dyn LinkStore>,
    links: RwLock<Vec<CrossWorkflowLink>>,
    engines: DashMap<WorkflowId, Arc<dyn EngineHandle>>,
}

impl CrossWorkflowRouter {
    #[must_use]
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store, links: RwLock::new(Vec::new()), engines: DashMap::new() }
    }

    /// Register (or replace) the engine handle a routed event targeting
    /// `workflow_id` is delivered to.
    pub fn register_engine(&self, workflow_id: WorkflowId, engine: Arc<dyn EngineHandle>) {
        self.engines.insert(workflow_id, engine);
    }

    pub fn unregister_engine(&self, workflow_id: WorkflowId) {
        self.engines.remove(&workflow_id);
    }

    /// Reload the link index from the backing store (§4.7 `RefreshLinks`).
    pub async fn refresh_links(&self) {
        let fresh = self.store.list_links().await;
        *self.links.write() = fresh;
    }

    /// Route an emitted event to every matching link's target engine.
    /// Never fails the caller; returns the first surfaced delivery error
    /// for observability, if any (§4.7, §7 "Routing errors").
    pub async fn route_event(&self, source_workflow_id: WorkflowId, event_type: &str, data: Value) -> Option<RoutingError> {
        let matches: Vec<CrossWorkflowLink> = self
            .links
            .read()
            .iter()
            .filter(|link| link.matches(source_workflow_id, event_type))
            .cloned()
            .collect();

        let mut first_error = None;
        for link in matches {
            let Some(engine) = self.engines.get(&link.target_workflow_id).map(|e| e.clone()) else {
                let err = RoutingError::TargetEngineUnavailable { workflow_id: link.target_workflow_id.to_string() };
                tracing::warn!(workflow_id = %link.target_workflow_id, "target engine unavailable for routed event");
                first_error.get_or_insert(err);
                continue;
            };
            if let Err(err) = engine.trigger_workflow("pipeline", event_type, data.clone()).await {
                tracing::warn!(workflow_id = %link.target_workflow_id, error = %err, "delivery to routed target failed");
                first_error.get_or_insert(err);
            }
        }
        first_error
    }
}
