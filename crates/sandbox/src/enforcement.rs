//! Per-call deadline and output-size enforcement (§4.4 "Resource
//! enforcement").

use std::time::Duration;

use nebula_error::SandboxError;
use serde_json::Value;

use crate::component::ManagedComponent;

/// `{max_execution_time_ms, max_output_size}`; either set to `0` disables
/// that check (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_execution_time_ms: u64,
    pub max_output_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_execution_time_ms: 30_000, max_output_size: 1000 }
    }
}

/// Run `component.execute(params)` under `limits`. The component's own
/// call already runs on a spawned task (see [`ManagedComponent`]); this
/// races that task against the deadline, and measures the output against
/// the top-level key cap once it completes.
pub async fn execute_with_limits(
    component: &ManagedComponent,
    params: Value,
    limits: &Limits,
) -> Result<Value, SandboxError> {
    let result = if limits.max_execution_time_ms == 0 {
        component.execute(params).await
    } else {
        let deadline = Duration::from_millis(limits.max_execution_time_ms);
        match tokio::time::timeout(deadline, component.execute(params)).await {
            Ok(result) => result,
            Err(_) => {
                return Err(SandboxError::ExecutionTimedOut { elapsed_ms: limits.max_execution_time_ms });
            }
        }
    }?;

    if limits.max_output_size > 0 {
        let count = result.as_object().map_or(0, serde_json::Map::len);
        if count > limits.max_output_size {
            return Err(SandboxError::OutputLimitExceeded { actual: count, limit: limits.max_output_size });
        }
    }

    Ok(result)
}
