//! In-memory execution recorder (C7, §4.6).
//!
//! Backs both the narrow [`nebula_execution::RecorderPort`] the executor
//! depends on, and the broader query surface (`ListExecutions`,
//! `GetExecution`, `ListSteps`, `CountByStatus`, log `Query`,
//! `CountByLevel`) the admin HTTP layer reads from. A concrete SQL-backed
//! store is an external collaborator (§1); this one is the store the
//! server wires at post-start and keeps across a hot reload (§4.3).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use nebula_core::{AuditId, ExecutionId, LogId, SequenceGenerator, WorkflowId};
use parking_lot::RwLock;
use serde_json::Value;

use crate::execution::{ExecutionFilter, ExecutionRecord, ExecutionStatus};
use crate::log::{AuditEntry, LineSink, LogEntry, LogFilter, LogLevel, LogWriter};
use crate::step::ExecutionStep;

/// The execution-tracking recorder (C7).
pub struct ExecutionRecorder {
    executions: DashMap<ExecutionId, ExecutionRecord>,
    /// Insertion order, oldest first; reversed for the default
    /// most-recent-first listing (§4.6 invariant).
    order: RwLock<Vec<ExecutionId>>,
    steps: DashMap<ExecutionId, Vec<ExecutionStep>>,
    logs: RwLock<Vec<LogEntry>>,
    audit: RwLock<Vec<AuditEntry>>,
    log_seq: SequenceGenerator,
    audit_seq: SequenceGenerator,
}

impl Default for ExecutionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            executions: DashMap::new(),
            order: RwLock::new(Vec::new()),
            steps: DashMap::new(),
            logs: RwLock::new(Vec::new()),
            audit: RwLock::new(Vec::new()),
            log_seq: SequenceGenerator::new(),
            audit_seq: SequenceGenerator::new(),
        }
    }

    pub fn start_execution(&self, workflow_id: WorkflowId, trigger_type: &str, trigger_data: Value) -> ExecutionId {
        let id = ExecutionId::v4();
        let record = ExecutionRecord::start(id, workflow_id, trigger_type.to_owned(), trigger_data, Utc::now());
        self.executions.insert(id, record);
        self.order.write().push(id);
        id
    }

    pub fn push_step(&self, execution_id: ExecutionId, step: ExecutionStep) {
        let mut steps = self.steps.entry(execution_id).or_default();
        if let Some(existing) = steps.iter_mut().find(|s| s.sequence_num == step.sequence_num) {
            *existing = step;
        } else {
            steps.push(step);
        }
        steps.sort_by_key(|s| s.sequence_num);
    }

    pub fn complete_execution(&self, execution_id: ExecutionId, output: Value) {
        if let Some(mut record) = self.executions.get_mut(&execution_id) {
            record.output_data = Some(output);
            record.finish(ExecutionStatus::Completed, Utc::now());
        } else {
            tracing::warn!(%execution_id, "complete_execution: no such execution");
        }
    }

    pub fn fail_execution(&self, execution_id: ExecutionId, error: &str) {
        if let Some(mut record) = self.executions.get_mut(&execution_id) {
            record.error_message = Some(error.to_owned());
            record.finish(ExecutionStatus::Failed, Utc::now());
        } else {
            tracing::warn!(%execution_id, "fail_execution: no such execution");
        }
    }

    pub fn cancel_execution(&self, execution_id: ExecutionId) {
        if let Some(mut record) = self.executions.get_mut(&execution_id) {
            record.finish(ExecutionStatus::Cancelled, Utc::now());
        } else {
            tracing::warn!(%execution_id, "cancel_execution: no such execution");
        }
    }

    #[must_use]
    pub fn get_execution(&self, execution_id: ExecutionId) -> Option<ExecutionRecord> {
        self.executions.get(&execution_id).map(|r| r.clone())
    }

    #[must_use]
    pub fn list_executions(&self, filter: &ExecutionFilter) -> Vec<ExecutionRecord> {
        let order = self.order.read();
        let mut out: Vec<ExecutionRecord> = order
            .iter()
            .filter_map(|id| self.executions.get(id).map(|r| r.clone()))
            .filter(|record| filter.matches(record))
            .collect();
        if !filter.oldest_first {
            out.reverse();
        }
        out
    }

    /// `ListSteps(executionId)`: insertion-ordered by `sequenceNum` (P2).
    #[must_use]
    pub fn list_steps(&self, execution_id: ExecutionId) -> Vec<ExecutionStep> {
        self.steps.get(&execution_id).map(|s| s.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn count_by_status(&self, workflow_id: WorkflowId) -> HashMap<ExecutionStatus, u64> {
        let mut counts = HashMap::new();
        for entry in &self.executions {
            if entry.workflow_id == workflow_id {
                *counts.entry(entry.status).or_insert(0u64) += 1;
            }
        }
        counts
    }

    fn append_log(&self, workflow_id: WorkflowId, execution_id: Option<ExecutionId>, level: LogLevel, message: &str) {
        let id: LogId = self.log_seq.next();
        self.logs.write().push(LogEntry {
            id,
            workflow_id,
            execution_id,
            level,
            message: message.to_owned(),
            module_name: None,
            fields: Value::Null,
            created_at: Utc::now(),
        });
    }

    /// `LogWriter(workflowId, executionId, level) -> io::Writer` (§4.6).
    #[must_use]
    pub fn log_writer(self: &Arc<Self>, workflow_id: WorkflowId, execution_id: Option<ExecutionId>, level: LogLevel) -> LogWriter {
        LogWriter::new(Arc::clone(self) as Arc<dyn LineSink>, workflow_id, execution_id, level)
    }

    #[must_use]
    pub fn query_logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.logs.read().iter().filter(|entry| filter.matches(entry)).cloned().collect()
    }

    #[must_use]
    pub fn count_by_level(&self, workflow_id: WorkflowId) -> HashMap<LogLevel, u64> {
        let mut counts = HashMap::new();
        for entry in self.logs.read().iter() {
            if entry.workflow_id == workflow_id {
                *counts.entry(entry.level).or_insert(0u64) += 1;
            }
        }
        counts
    }

    /// Appends an audit entry with the next strictly-increasing id (P3).
    pub fn record_audit(&self, user_id: Option<nebula_core::UserId>, action: &str, resource_type: &str, resource_id: Option<String>, ip_address: &str) -> AuditId {
        let id: AuditId = self.audit_seq.next();
        self.audit.write().push(AuditEntry {
            id,
            user_id,
            action: action.to_owned(),
            resource_type: resource_type.to_owned(),
            resource_id,
            ip_address: ip_address.to_owned(),
            created_at: Utc::now(),
        });
        id
    }

    #[must_use]
    pub fn list_audit(&self) -> Vec<AuditEntry> {
        self.audit.read().clone()
    }
}

impl LineSink for ExecutionRecorder {
    fn accept_line(&self, workflow_id: WorkflowId, execution_id: Option<ExecutionId>, level: LogLevel, line: &str) {
        self.append_log(workflow_id, execution_id, level, line);
    }
}

#[async_trait]
impl nebula_execution::RecorderPort for ExecutionRecorder {
    async fn record_start(&self, workflow_id: WorkflowId, trigger_type: &str, trigger_data: Value) -> ExecutionId {
        self.start_execution(workflow_id, trigger_type, trigger_data)
    }

    async fn record_step(&self, execution_id: ExecutionId, step: nebula_execution::StepRecord) {
        let now = Utc::now();
        let (started_at, completed_at) = match step.status {
            nebula_execution::StepStatus::Running => (Some(now), None),
            nebula_execution::StepStatus::Completed | nebula_execution::StepStatus::Failed => (None, Some(now)),
        };
        // Preserve the `started_at` recorded by the earlier `Running`
        // transition rather than overwriting it with `None`.
        let started_at = started_at.or_else(|| {
            self.steps
                .get(&execution_id)
                .and_then(|steps| steps.iter().find(|s| s.sequence_num == step.sequence_num).and_then(|s| s.started_at))
        });
        self.push_step(
            execution_id,
            ExecutionStep {
                execution_id,
                sequence_num: step.sequence_num,
                step_name: step.name,
                step_type: step.step_type,
                status: step.status.into(),
                started_at,
                completed_at,
            },
        );
    }

    async fn record_complete(&self, execution_id: ExecutionId, output: Value) {
        self.complete_execution(execution_id, output);
    }

    async fn record_fail(&self, execution_id: ExecutionId, error: String) {
        self.fail_execution(execution_id, &error);
    }

    async fn record_cancel(&self, execution_id: ExecutionId) {
        self.cancel_execution(execution_id);
    }

    fn log(&self, execution_id: ExecutionId, level: nebula_execution::LogLevel, line: &str) {
        let workflow_id = self.executions.get(&execution_id).map(|r| r.workflow_id);
        if let Some(workflow_id) = workflow_id {
            self.append_log(workflow_id, Some(execution_id), level.into(), line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_execution::RecorderPort;

    #[tokio::test]
    async fn start_complete_round_trip_matches_p1() {
        let recorder = ExecutionRecorder::new();
        let workflow_id = WorkflowId::v4();
        let execution_id = recorder.record_start(workflow_id, "manual", serde_json::json!({"order_id": "ORD-001"})).await;
        recorder.record_complete(execution_id, serde_json::json!({"status": "validated"})).await;

        let record = recorder.get_execution(execution_id).unwrap();
        assert_eq!(record.status, ExecutionStatus::Completed);
        assert!(record.completed_at.is_some());
        assert!(record.duration_ms.unwrap() >= 0);
    }

    #[tokio::test]
    async fn list_steps_returns_them_in_sequence_order() {
        let recorder = ExecutionRecorder::new();
        let workflow_id = WorkflowId::v4();
        let execution_id = recorder.record_start(workflow_id, "manual", Value::Null).await;
        for (seq, name) in [(0, "validate"), (1, "transform"), (2, "persist")] {
            nebula_execution::RecorderPort::record_step(
                &recorder,
                execution_id,
                nebula_execution::StepRecord { sequence_num: seq, name: name.to_owned(), step_type: "noop".into(), status: nebula_execution::StepStatus::Completed },
            )
            .await;
        }
        let steps = recorder.list_steps(execution_id);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2].step_name, "persist");
        assert_eq!(steps.iter().map(|s| s.sequence_num).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn list_executions_defaults_to_most_recent_first() {
        let recorder = ExecutionRecorder::new();
        let workflow_id = WorkflowId::v4();
        let first = recorder.record_start(workflow_id, "manual", Value::Null).await;
        let second = recorder.record_start(workflow_id, "manual", Value::Null).await;
        let listed = recorder.list_executions(&ExecutionFilter { workflow_id: Some(workflow_id), ..Default::default() });
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn count_by_status_tallies_per_workflow() {
        let recorder = ExecutionRecorder::new();
        let workflow_id = WorkflowId::v4();
        let a = recorder.record_start(workflow_id, "manual", Value::Null).await;
        let b = recorder.record_start(workflow_id, "manual", Value::Null).await;
        recorder.record_complete(a, Value::Null).await;
        recorder.record_fail(b, "boom".to_owned()).await;
        let counts = recorder.count_by_status(workflow_id);
        assert_eq!(counts.get(&ExecutionStatus::Completed), Some(&1));
        assert_eq!(counts.get(&ExecutionStatus::Failed), Some(&1));
    }

    #[test]
    fn audit_ids_strictly_increase_with_each_record() {
        let recorder = ExecutionRecorder::new();
        let first = recorder.record_audit(None, "create", "workflow", Some("wf-1".into()), "127.0.0.1");
        let second = recorder.record_audit(None, "update", "workflow", Some("wf-1".into()), "127.0.0.1");
        assert!(second > first);
    }

    #[test]
    fn log_writer_lines_are_queryable_by_level() {
        use std::io::Write as _;
        let recorder = Arc::new(ExecutionRecorder::new());
        let workflow_id = WorkflowId::v4();
        let mut writer = recorder.log_writer(workflow_id, None, LogLevel::Error);
        writeln!(writer, "disk full").unwrap();
        drop(writer);

        let counts = recorder.count_by_level(workflow_id);
        assert_eq!(counts.get(&LogLevel::Error), Some(&1));
        let logs = recorder.query_logs(&LogFilter { workflow_id: Some(workflow_id), ..Default::default() });
        assert_eq!(logs[0].message, "disk full");
    }
}
