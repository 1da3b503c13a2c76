//! Built-in pipeline step handlers (§4.5 item 3: `set`/`transform` mutate
//! the context; `conditional` branches; `publish`/`delegate` emit events
//! or HTTP calls).

use std::sync::Arc;

use async_trait::async_trait;
use nebula_registry::StepRegistry;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::ExecutionError;
use crate::event::{Event, EventSink};

/// A step implementation, resolved by `type` from `nebula-registry`'s
/// [`StepRegistry`].
///
/// A handler may steer control flow by returning an object containing
/// `__next`: the executor treats that as an override of the step's
/// statically configured `next` (used by [`Conditional`]).
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn execute(&self, ctx: &ExecutionContext, config: &Value) -> Result<Value, ExecutionError>;
}

/// Register the built-in step types (`set`, `transform`, `conditional`,
/// `publish`) under their type keys. Custom step types register into the
/// same registry alongside these.
pub fn register_builtins(registry: &StepRegistry<Arc<dyn StepHandler>>) {
    registry.register("noop", Arc::new(Noop) as Arc<dyn StepHandler>);
    registry.register("set", Arc::new(Set));
    registry.register("transform", Arc::new(Transform));
    registry.register("conditional", Arc::new(Conditional));
    registry.register("publish", Arc::new(Publish::new(Arc::new(crate::event::NoopEventSink))));
}

/// Does nothing; useful as a placeholder or pipeline terminator.
pub struct Noop;

#[async_trait]
impl StepHandler for Noop {
    async fn execute(&self, _ctx: &ExecutionContext, _config: &Value) -> Result<Value, ExecutionError> {
        Ok(Value::Null)
    }
}

/// `{path, value}` — writes `value` into the context at `path`.
pub struct Set;

#[async_trait]
impl StepHandler for Set {
    async fn execute(&self, ctx: &ExecutionContext, config: &Value) -> Result<Value, ExecutionError> {
        let path = config.get("path").and_then(Value::as_str).unwrap_or_default();
        let value = config.get("value").cloned().unwrap_or(Value::Null);
        ctx.set(path, value.clone());
        Ok(value)
    }
}

/// `{path, merge}` — shallow-merges `merge`'s object keys into whatever
/// object already lives at `path` in the context.
pub struct Transform;

#[async_trait]
impl StepHandler for Transform {
    async fn execute(&self, ctx: &ExecutionContext, config: &Value) -> Result<Value, ExecutionError> {
        let path = config.get("path").and_then(Value::as_str).unwrap_or_default();
        let merge = config.get("merge").cloned().unwrap_or(Value::Null);
        let mut current = ctx.get(path).unwrap_or(Value::Object(serde_json::Map::new()));
        if let (Some(target), Some(source)) = (current.as_object_mut(), merge.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        ctx.set(path, current.clone());
        Ok(current)
    }
}

/// `{path, equals, whenTrue, whenFalse}` — compares the value at `path`
/// to `equals` and returns a `__next` override naming the matching step.
pub struct Conditional;

#[async_trait]
impl StepHandler for Conditional {
    async fn execute(&self, ctx: &ExecutionContext, config: &Value) -> Result<Value, ExecutionError> {
        let path = config.get("path").and_then(Value::as_str).unwrap_or_default();
        let expected = config.get("equals").cloned().unwrap_or(Value::Null);
        let matched = ctx.get(path).as_ref() == Some(&expected);
        let branch_key = if matched { "whenTrue" } else { "whenFalse" };
        let next = config.get(branch_key).cloned().unwrap_or(Value::Null);
        Ok(serde_json::json!({ "__next": next, "matched": matched }))
    }
}

/// `{eventType, data}` — emits a typed event through the configured
/// [`EventSink`], also offering it to C8 for cross-workflow routing.
pub struct Publish {
    sink: Arc<dyn EventSink>,
}

impl Publish {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl StepHandler for Publish {
    async fn execute(&self, ctx: &ExecutionContext, config: &Value) -> Result<Value, ExecutionError> {
        let event_type = config.get("eventType").and_then(Value::as_str).unwrap_or("unknown").to_owned();
        let data = config.get("data").cloned().unwrap_or(Value::Null);
        self.sink.emit(Event { workflow_id: ctx.workflow_id, event_type: event_type.clone(), data: data.clone() });
        Ok(serde_json::json!({ "published": event_type }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::{ExecutionId, WorkflowId};
    use serde_json::json;

    #[tokio::test]
    async fn set_writes_the_configured_path() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        Set.execute(&ctx, &json!({"path": "status", "value": "ok"})).await.unwrap();
        assert_eq!(ctx.get("status"), Some(json!("ok")));
    }

    #[tokio::test]
    async fn transform_merges_into_an_existing_object() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.set("customer", json!({"id": "c1"}));
        Transform.execute(&ctx, &json!({"path": "customer", "merge": {"name": "Ada"}})).await.unwrap();
        assert_eq!(ctx.get("customer"), Some(json!({"id": "c1", "name": "Ada"})));
    }

    #[tokio::test]
    async fn conditional_picks_when_true_on_a_match() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.set("status", json!("ok"));
        let out = Conditional
            .execute(&ctx, &json!({"path": "status", "equals": "ok", "whenTrue": "ship", "whenFalse": "hold"}))
            .await
            .unwrap();
        assert_eq!(out["__next"], json!("ship"));
        assert_eq!(out["matched"], json!(true));
    }

    #[tokio::test]
    async fn conditional_picks_when_false_on_a_mismatch() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.set("status", json!("pending"));
        let out = Conditional
            .execute(&ctx, &json!({"path": "status", "equals": "ok", "whenTrue": "ship", "whenFalse": "hold"}))
            .await
            .unwrap();
        assert_eq!(out["__next"], json!("hold"));
    }
}
