//! Persisted execution step (§3 "Execution step", P2).

use chrono::{DateTime, Utc};
use nebula_core::ExecutionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl From<nebula_execution::StepStatus> for StepStatus {
    fn from(value: nebula_execution::StepStatus) -> Self {
        match value {
            nebula_execution::StepStatus::Running => StepStatus::Running,
            nebula_execution::StepStatus::Completed => StepStatus::Completed,
            nebula_execution::StepStatus::Failed => StepStatus::Failed,
        }
    }
}

/// `{executionId, sequenceNum (0-based, dense), stepName, stepType,
/// status, startedAt?, completedAt?}` (§3). Steps for one execution are
/// insertion-ordered by `sequenceNum`; `ListSteps` returns them in that
/// order (invariant, P2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub execution_id: ExecutionId,
    pub sequence_num: u64,
    pub step_name: String,
    pub step_type: String,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
