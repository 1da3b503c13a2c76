//! Persisted workflow records (§6 "Persisted state layout: `workflow.db`").

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_core::WorkflowId;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRecord {
    pub id: WorkflowId,
    pub key: String,
    pub version: u32,
    pub yaml: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct WorkflowStore {
    records: DashMap<WorkflowId, WorkflowRecord>,
}

impl WorkflowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, or bump the version and replace the yaml of, a workflow
    /// record.
    pub fn upsert(&self, id: WorkflowId, key: impl Into<String>, yaml: impl Into<String>, at: DateTime<Utc>) -> WorkflowRecord {
        let key = key.into();
        let yaml = yaml.into();
        let mut record = self.records.entry(id).or_insert_with(|| WorkflowRecord { id, key: key.clone(), version: 0, yaml: String::new(), created_at: at, updated_at: at });
        record.version += 1;
        record.key = key;
        record.yaml = yaml;
        record.updated_at = at;
        record.clone()
    }

    #[must_use]
    pub fn get(&self, id: WorkflowId) -> Option<WorkflowRecord> {
        self.records.get(&id).map(|r| r.clone())
    }

    #[must_use]
    pub fn list(&self) -> Vec<WorkflowRecord> {
        self.records.iter().map(|r| r.clone()).collect()
    }

    /// Removes a workflow record. Returns `true` if one was present.
    pub fn remove(&self, id: WorkflowId) -> bool {
        self.records.remove(&id).is_some()
    }
}
