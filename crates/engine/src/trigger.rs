//! Trigger factories (§3 "Trigger descriptor", §4.3 step 3).
//!
//! A trigger's `type` key resolves to a [`TriggerFactory`], which is
//! handed the workflow handler it is linked to (named by the
//! descriptor's `module` field, per the current config shape) and
//! produces the [`nebula_app::Service`] that actually listens for the
//! external event — an HTTP webhook trigger starts a listener on
//! `Start`, a polling trigger spawns a loop stopped via its
//! `CancellationToken` on `Stop` (§10.5).

use std::sync::Arc;

use nebula_app::Service;
use nebula_config::TriggerDescriptor;
use nebula_error::ConfigError;

use crate::handler::WorkflowHandler;

pub trait TriggerFactory: Send + Sync {
    fn build(&self, descriptor: &TriggerDescriptor, workflow: Arc<dyn WorkflowHandler>) -> Result<Arc<dyn Service>, ConfigError>;
}
