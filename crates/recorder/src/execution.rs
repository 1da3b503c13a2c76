//! Persisted execution record (§3 "Execution record", P1).

use chrono::{DateTime, Utc};
use nebula_core::{ExecutionId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

/// `{id, workflowId, triggerType, triggerData, status, startedAt,
/// completedAt?, durationMs?, outputData?, errorMessage?}` (§3).
///
/// Invariants enforced by the store that creates these, not by the type
/// itself: `completedAt >= startedAt`; `status != running => completedAt
/// set`; `durationMs = completedAt - startedAt` in ms (P1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub trigger_type: String,
    pub trigger_data: Value,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub output_data: Option<Value>,
    pub error_message: Option<String>,
}

impl ExecutionRecord {
    #[must_use]
    pub fn start(id: ExecutionId, workflow_id: WorkflowId, trigger_type: String, trigger_data: Value, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            workflow_id,
            trigger_type,
            trigger_data,
            status: ExecutionStatus::Running,
            started_at,
            completed_at: None,
            duration_ms: None,
            output_data: None,
            error_message: None,
        }
    }

    /// Transition to a terminal status, filling in `completedAt` and
    /// `durationMs` so P1 holds by construction.
    pub fn finish(&mut self, status: ExecutionStatus, completed_at: DateTime<Utc>) {
        debug_assert!(status.is_terminal());
        let completed_at = completed_at.max(self.started_at);
        self.duration_ms = Some((completed_at - self.started_at).num_milliseconds().max(0));
        self.completed_at = Some(completed_at);
        self.status = status;
    }
}

/// Filter for `ListExecutions` (§4.6).
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub workflow_id: Option<WorkflowId>,
    pub status: Option<ExecutionStatus>,
    /// Listings are most-recent-first by default (§4.6 invariant); set
    /// this to list oldest-first instead.
    pub oldest_first: bool,
}

impl ExecutionFilter {
    #[must_use]
    pub fn matches(&self, record: &ExecutionRecord) -> bool {
        self.workflow_id.is_none_or(|id| id == record.workflow_id)
            && self.status.is_none_or(|status| status == record.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_computes_a_non_negative_duration() {
        let started = Utc::now();
        let mut record = ExecutionRecord::start(ExecutionId::v4(), WorkflowId::v4(), "manual".into(), Value::Null, started);
        record.finish(ExecutionStatus::Completed, started + chrono::Duration::milliseconds(150));
        assert_eq!(record.duration_ms, Some(150));
        assert!(record.status.is_terminal());
    }

    #[test]
    fn finish_clamps_completed_at_to_not_precede_started_at() {
        let started = Utc::now();
        let mut record = ExecutionRecord::start(ExecutionId::v4(), WorkflowId::v4(), "manual".into(), Value::Null, started);
        record.finish(ExecutionStatus::Failed, started - chrono::Duration::seconds(5));
        assert_eq!(record.duration_ms, Some(0));
    }

    #[test]
    fn filter_matches_on_workflow_and_status() {
        let workflow_id = WorkflowId::v4();
        let record = ExecutionRecord::start(ExecutionId::v4(), workflow_id, "manual".into(), Value::Null, Utc::now());
        let filter = ExecutionFilter { workflow_id: Some(workflow_id), status: Some(ExecutionStatus::Running), oldest_first: false };
        assert!(filter.matches(&record));

        let filter = ExecutionFilter { status: Some(ExecutionStatus::Completed), ..Default::default() };
        assert!(!filter.matches(&record));
    }
}
