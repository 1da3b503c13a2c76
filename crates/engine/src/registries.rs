//! The factory catalogues [`crate::Engine::build_from_config`] resolves
//! descriptor `type` keys against (C2).
//!
//! Unlike the [`crate::Engine`] a build produces, these registries are
//! persistent across a hot reload: registering a plugin type once makes
//! it available to every subsequent `Reload`, matching
//! [`nebula_registry::FactoryRegistry`]'s idempotent-by-key registration.

use std::sync::Arc;

use nebula_registry::{ModuleRegistry, TriggerRegistry, WorkflowHandlerRegistry};

use crate::handler::WorkflowHandlerFactory;
use crate::module::ModuleFactory;
use crate::trigger::TriggerFactory;

/// Bundles the three type registries [`crate::Engine::build_from_config`]
/// needs. Built once by the server shell and shared across reloads.
#[derive(Default)]
pub struct EngineRegistries {
    pub modules: ModuleRegistry<Arc<dyn ModuleFactory>>,
    pub workflow_handlers: WorkflowHandlerRegistry<Arc<dyn WorkflowHandlerFactory>>,
    pub triggers: TriggerRegistry<Arc<dyn TriggerFactory>>,
}

impl EngineRegistries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
