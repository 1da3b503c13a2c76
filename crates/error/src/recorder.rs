//! Recorder errors (§7 "Recorder errors", §4.6).
//!
//! Storage write failures under the recorder are logged and treated as
//! best-effort: callers generally do not propagate [`RecorderError`] into
//! execution outcomes, but it is still a distinct type so a caller that
//! wants strict accounting (e.g. a test) can observe it.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecorderError {
    #[error("storage write failed: {reason}")]
    WriteFailed { reason: String },

    #[error("execution `{execution_id}` not found")]
    ExecutionNotFound { execution_id: String },
}
