//! Workflow handlers (§3 "Workflow descriptor", §4.3 step 2).
//!
//! A workflow's `handlerType` resolves to a [`WorkflowHandlerFactory`],
//! which is handed the descriptor's body and produces the
//! [`WorkflowHandler`] that actually runs the workflow when a trigger (or
//! a routed cross-workflow event) fires it. The built-in `pipeline`
//! handler type is [`crate::builtin::PipelineHandlerFactory`].

use async_trait::async_trait;
use nebula_config::WorkflowDescriptor;
use nebula_error::ConfigError;
use nebula_execution::ExecutionError;
use serde_json::Value;
use std::sync::Arc;

/// Runs one workflow to completion given the event that triggered it.
#[async_trait]
pub trait WorkflowHandler: Send + Sync {
    async fn handle(&self, trigger_type: &str, data: Value) -> Result<Value, ExecutionError>;
}

/// Builds the [`WorkflowHandler`] for one workflow descriptor.
pub trait WorkflowHandlerFactory: Send + Sync {
    fn build(&self, descriptor: &WorkflowDescriptor) -> Result<Arc<dyn WorkflowHandler>, ConfigError>;
}
