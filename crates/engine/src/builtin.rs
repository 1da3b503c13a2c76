//! The built-in `pipeline` workflow handler type (§4.5).
//!
//! Registering [`PipelineHandlerFactory`] under the key `"pipeline"` in a
//! [`nebula_registry::WorkflowHandlerRegistry`] is what makes a workflow
//! descriptor's `steps`/`entry` body runnable — every other handler type
//! a deployment defines is a distinct [`crate::WorkflowHandlerFactory`]
//! the server shell registers alongside it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use nebula_config::WorkflowDescriptor;
use nebula_core::WorkflowId;
use nebula_error::ConfigError;
use nebula_execution::{ExecutionError, NoopRecorder, PipelineExecutor, RecorderPort, StepHandler};
use nebula_registry::StepRegistry;
use nebula_workflow::WorkflowDefinition;
use serde_json::Value;

use crate::handler::{WorkflowHandler, WorkflowHandlerFactory};

/// A [`RecorderPort`] whose concrete target can be swapped after
/// construction, without the pipeline executors holding it needing to be
/// rebuilt.
///
/// The recorder (C7) is a post-start service the server shell owns across
/// a hot reload (§4.3 step 5: "re-wire delegate handlers that depend on
/// services that appear only after Start"). Every `pipeline` handler is
/// built with a clone of the same [`SwappableRecorder`] the shell holds,
/// so calling [`SwappableRecorder::rewire`] once the real recorder exists
/// takes effect for every workflow without touching the engine.
pub struct SwappableRecorder {
    inner: ArcSwap<dyn RecorderPort>,
}

impl Default for SwappableRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SwappableRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: ArcSwap::new(Arc::new(NoopRecorder) as Arc<dyn RecorderPort>) }
    }

    /// Point every holder of this handle at `recorder` from now on.
    pub fn rewire(&self, recorder: Arc<dyn RecorderPort>) {
        self.inner.store(recorder);
    }
}

#[async_trait]
impl RecorderPort for SwappableRecorder {
    async fn record_start(&self, workflow_id: WorkflowId, trigger_type: &str, trigger_data: Value) -> nebula_core::ExecutionId {
        self.inner.load().record_start(workflow_id, trigger_type, trigger_data).await
    }

    async fn record_step(&self, execution_id: nebula_core::ExecutionId, step: nebula_execution::StepRecord) {
        self.inner.load().record_step(execution_id, step).await;
    }

    async fn record_complete(&self, execution_id: nebula_core::ExecutionId, output: Value) {
        self.inner.load().record_complete(execution_id, output).await;
    }

    async fn record_fail(&self, execution_id: nebula_core::ExecutionId, error: String) {
        self.inner.load().record_fail(execution_id, error).await;
    }

    async fn record_cancel(&self, execution_id: nebula_core::ExecutionId) {
        self.inner.load().record_cancel(execution_id).await;
    }

    fn log(&self, execution_id: nebula_core::ExecutionId, level: nebula_execution::LogLevel, line: &str) {
        self.inner.load().log(execution_id, level, line);
    }
}

/// Builds the `pipeline` [`WorkflowHandler`] type: resolves the
/// descriptor's step graph (C3's `nebula-workflow`) and wraps it with a
/// [`PipelineExecutor`] (C6) sharing this factory's step registry and
/// recorder hook.
pub struct PipelineHandlerFactory {
    steps: Arc<StepRegistry<Arc<dyn StepHandler>>>,
    recorder: Arc<SwappableRecorder>,
}

impl PipelineHandlerFactory {
    #[must_use]
    pub fn new(steps: Arc<StepRegistry<Arc<dyn StepHandler>>>, recorder: Arc<SwappableRecorder>) -> Self {
        Self { steps, recorder }
    }
}

impl WorkflowHandlerFactory for PipelineHandlerFactory {
    fn build(&self, descriptor: &WorkflowDescriptor) -> Result<Arc<dyn WorkflowHandler>, ConfigError> {
        let definition = WorkflowDefinition::resolve(descriptor)?;
        let executor = PipelineExecutor::new(Arc::clone(&self.steps), Arc::clone(&self.recorder) as Arc<dyn RecorderPort>);
        Ok(Arc::new(PipelineWorkflowHandler { workflow_id: WorkflowId::v4(), definition, executor }))
    }
}

/// A single workflow's runnable pipeline. The [`WorkflowId`] assigned here
/// is this run's routing/recording identity; the server shell reconciles
/// it with the persisted [`nebula_core::WorkflowId`] from `workflow.db`
/// when a deploy or reload needs the two to agree (§9 "Hot reload without
/// losing state").
struct PipelineWorkflowHandler {
    workflow_id: WorkflowId,
    definition: WorkflowDefinition,
    executor: PipelineExecutor,
}

#[async_trait]
impl WorkflowHandler for PipelineWorkflowHandler {
    async fn handle(&self, trigger_type: &str, data: Value) -> Result<Value, ExecutionError> {
        self.executor.run(self.workflow_id, &self.definition, trigger_type, data).await
    }
}
