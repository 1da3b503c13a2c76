//! # Nebula Storage
//!
//! The v1 persistent store (part of C12, §6 "Persisted state layout"):
//! workflow records, memberships, idempotency keys, environments, and
//! extracted bundle metadata. A concrete SQL-backed implementation with
//! migrations is an external collaborator (§1); [`V1Store`] is the
//! in-memory implementation used by the server shell and by tests.

mod bundle;
mod environment;
mod idempotency;
mod membership;
mod workflow;

pub use bundle::{BundleRecord, BundleStore};
pub use environment::{EnvironmentRecord, EnvironmentStore};
pub use idempotency::IdempotencyStore;
pub use membership::{MembershipScope, MembershipStore};
pub use workflow::{WorkflowRecord, WorkflowStore};

/// The aggregate v1 store: one struct the server shell owns across hot
/// reloads, bundling the individual stores above (§9 "Hot reload without
/// losing state" — stores live outside the engine and survive reload,
/// P11).
#[derive(Default)]
pub struct V1Store {
    pub workflows: WorkflowStore,
    pub memberships: MembershipStore,
    pub idempotency: IdempotencyStore,
    pub environments: EnvironmentStore,
    pub bundles: BundleStore,
}

impl V1Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
