//! Execution-local error type.
//!
//! Cancellation is a control-flow signal specific to the executor, not one
//! of the error kinds in the shared taxonomy (§7) — it never reaches the
//! recorder as a failure cause the way a step error does.

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("execution was cancelled")]
    Cancelled,
    #[error(transparent)]
    Step(#[from] nebula_error::Error),
}
