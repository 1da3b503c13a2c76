//! Cross-workflow routing errors (§7 "Routing errors", §4.7).
//!
//! `NoMatchingLink` is deliberately not a variant here: the spec calls it
//! "silent, not an error" — absence of a match is the normal, successful
//! outcome of `RouteEvent` when nothing subscribes to an event type.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("target engine unavailable for workflow `{workflow_id}`")]
    TargetEngineUnavailable { workflow_id: String },

    #[error("embedded wildcard is not supported in link pattern `{pattern}`")]
    EmbeddedWildcard { pattern: String },

    #[error("workflow handler for `{workflow_key}` failed: {reason}")]
    HandlerFailed { workflow_key: String, reason: String },
}
