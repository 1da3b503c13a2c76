//! Persisted environments (§6 "Persisted state layout: `environments.db`",
//! §3 "Deployment state (blue/green)").

use std::collections::HashMap;

use dashmap::DashMap;
use nebula_core::WorkflowId;

/// A named deployment environment for a workflow (e.g. blue/green's `A`
/// and `B`, or a canary/stable split), carrying whatever key/value
/// metadata the active strategy needs to remember across restarts.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentRecord {
    pub workflow_id: WorkflowId,
    pub name: String,
    pub version: u32,
    pub metadata: HashMap<String, String>,
}

#[derive(Default)]
pub struct EnvironmentStore {
    environments: DashMap<(WorkflowId, String), EnvironmentRecord>,
}

impl EnvironmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, record: EnvironmentRecord) {
        self.environments.insert((record.workflow_id, record.name.clone()), record);
    }

    #[must_use]
    pub fn get(&self, workflow_id: WorkflowId, name: &str) -> Option<EnvironmentRecord> {
        self.environments.get(&(workflow_id, name.to_owned())).map(|r| r.clone())
    }

    #[must_use]
    pub fn list_for_workflow(&self, workflow_id: WorkflowId) -> Vec<EnvironmentRecord> {
        self.environments.iter().filter(|entry| entry.key().0 == workflow_id).map(|entry| entry.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let store = EnvironmentStore::new();
        let workflow_id = WorkflowId::v4();
        store.put(EnvironmentRecord { workflow_id, name: "A".to_owned(), version: 3, metadata: HashMap::new() });

        let record = store.get(workflow_id, "A").unwrap();
        assert_eq!(record.version, 3);
    }

    #[test]
    fn list_for_workflow_only_returns_that_workflows_environments() {
        let store = EnvironmentStore::new();
        let wf_a = WorkflowId::v4();
        let wf_b = WorkflowId::v4();
        store.put(EnvironmentRecord { workflow_id: wf_a, name: "A".to_owned(), version: 1, metadata: HashMap::new() });
        store.put(EnvironmentRecord { workflow_id: wf_b, name: "A".to_owned(), version: 1, metadata: HashMap::new() });

        assert_eq!(store.list_for_workflow(wf_a).len(), 1);
    }
}
