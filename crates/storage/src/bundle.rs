//! Extracted bundle metadata (§6 "Persisted state layout:
//! `workspaces/<uuid>/workflow.yaml` + `manifest.json`", §6 "Bundle format").

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_core::WorkflowId;

/// `manifest.json`'s `{name, description}` plus the extraction bookkeeping
/// the import flow needs to stay idempotent (§6 "Bundle format").
#[derive(Debug, Clone, PartialEq)]
pub struct BundleRecord {
    pub checksum: String,
    pub workflow_id: WorkflowId,
    pub manifest_name: String,
    pub manifest_description: String,
    pub workspace_path: String,
    pub imported_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct BundleStore {
    bundles: DashMap<String, BundleRecord>,
}

impl BundleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing record for `checksum` without overwriting it,
    /// so a repeated import of the same bundle is a no-op (§6, §11
    /// "idempotent bundle import").
    pub fn import_if_absent(&self, record: BundleRecord) -> BundleRecord {
        self.bundles.entry(record.checksum.clone()).or_insert(record).clone()
    }

    #[must_use]
    pub fn get(&self, checksum: &str) -> Option<BundleRecord> {
        self.bundles.get(checksum).map(|r| r.clone())
    }
}
