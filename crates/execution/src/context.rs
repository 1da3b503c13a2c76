//! Per-execution context with dotted-path variable lookup (§4.5 item 3,
//! §11 "dotted-path context lookup").

use std::sync::Arc;

use nebula_core::{ExecutionId, WorkflowId};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;

/// Runtime state for one in-flight execution. Not serializable — this
/// holds the live `Arc`/lock wrapping the accumulated data, plus the
/// cancellation token the server signals on shutdown or a cancel request.
/// The persisted record of what happened is `nebula-recorder`'s job.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    data: Arc<RwLock<Value>>,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(execution_id: ExecutionId, workflow_id: WorkflowId) -> Self {
        Self {
            execution_id,
            workflow_id,
            data: Arc::new(RwLock::new(Value::Object(Map::new()))),
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn check_cancelled(&self) -> Result<(), ExecutionError> {
        if self.cancellation.is_cancelled() {
            Err(ExecutionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Dotted-path lookup, e.g. `"steps.validate.amount"`. Returns `None`
    /// if any segment is absent or not an object.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Value> {
        let data = self.data.read();
        let mut current = &*data;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }

    /// Set a dotted path, creating intermediate objects as needed. A
    /// non-object value found along the path is replaced with an object.
    pub fn set(&self, path: &str, value: Value) {
        let mut data = self.data.write();
        let segments: Vec<&str> = path.split('.').collect();
        set_path(&mut data, &segments, value);
    }

    /// Merge a step's output under `steps.<name>` (§4.5 item 3).
    pub fn merge_step_output(&self, step_name: &str, output: Value) {
        self.set(&format!("steps.{step_name}"), output);
    }

    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.data.read().clone()
    }
}

fn set_path(current: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else { return };
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    let object = current.as_object_mut().expect("just ensured object");
    if rest.is_empty() {
        object.insert((*head).to_owned(), value);
        return;
    }
    let child = object.entry((*head).to_owned()).or_insert_with(|| Value::Object(Map::new()));
    set_path(child, rest, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_roundtrips_a_top_level_key() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.set("customerId", json!("cust-1"));
        assert_eq!(ctx.get("customerId"), Some(json!("cust-1")));
    }

    #[test]
    fn dotted_path_reaches_into_nested_step_output() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.merge_step_output("validate", json!({"amount": 42, "currency": "USD"}));
        assert_eq!(ctx.get("steps.validate.amount"), Some(json!(42)));
    }

    #[test]
    fn missing_path_segment_returns_none() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.merge_step_output("validate", json!({"amount": 42}));
        assert_eq!(ctx.get("steps.validate.missing"), None);
        assert_eq!(ctx.get("steps.missing.amount"), None);
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        ctx.set("customer.address.city", json!("Berlin"));
        assert_eq!(ctx.get("customer.address.city"), Some(json!("Berlin")));
    }

    #[test]
    fn check_cancelled_reflects_the_token() {
        let ctx = ExecutionContext::new(ExecutionId::v4(), WorkflowId::v4());
        assert!(ctx.check_cancelled().is_ok());
        ctx.cancellation().cancel();
        assert!(ctx.check_cancelled().is_err());
    }
}
