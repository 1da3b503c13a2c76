//! Sandbox errors (§7 "Sandbox errors", §4.4).

/// Errors raised by the dynamic-component sandbox (C5).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    #[error("invalid source: {reason}")]
    SourceInvalid { reason: String },

    #[error("disallowed import `{path}`")]
    DisallowedImport { path: String },

    #[error("interpreter error: {reason}")]
    InterpreterError { reason: String },

    #[error("contract violation: {}", fields.join(", "))]
    ContractViolation { fields: Vec<String> },

    #[error("execution timed out after {elapsed_ms}ms")]
    ExecutionTimedOut { elapsed_ms: u64 },

    #[error("output limit exceeded: {actual} keys (limit {limit})")]
    OutputLimitExceeded { actual: usize, limit: usize },

    #[error("component panicked: {message}")]
    ComponentPanic { message: String },

    #[error("component `{component}` has no Execute entry point")]
    NoExecute { component: String },

    #[error("component `{component}` not found")]
    ComponentNotFound { component: String },
}
