//! Module factories (C2, §3 "Module descriptor").
//!
//! A module's `type` key resolves to a [`ModuleFactory`], which builds
//! the concrete [`nebula_app::Service`] the config's `name` and free-form
//! `config` map describe. The built service then joins the
//! [`nebula_app::Application`] [`crate::Engine::build_from_config`]
//! assembles, in `dependsOn` order.

use std::sync::Arc;

use nebula_app::Service;
use nebula_error::ConfigError;
use serde_json::Value;

/// Builds the service backing one module `type` (e.g. `memory_queue`,
/// `postgres_pool`). `name` is the descriptor's unique name within the
/// config, used to give the resulting service its [`Service::name`].
pub trait ModuleFactory: Send + Sync {
    fn build(&self, name: &str, config: &Value) -> Result<Arc<dyn Service>, ConfigError>;
}
