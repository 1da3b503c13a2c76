//! Persisted idempotency keys (§6 "Persisted state layout: `idempotency.db`").

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Tracks which idempotency keys have already been seen, so retried
/// requests (e.g. a repeated bundle import) are recognized rather than
/// applied twice.
#[derive(Default)]
pub struct IdempotencyStore {
    seen: DashMap<String, DateTime<Utc>>,
}

impl IdempotencyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as seen at `at`. Returns `true` if this is the first
    /// time the key has been recorded, `false` if it was already present.
    pub fn record(&self, key: impl Into<String>, at: DateTime<Utc>) -> bool {
        self.seen.insert(key.into(), at).is_none()
    }

    #[must_use]
    pub fn has_seen(&self, key: &str) -> bool {
        self.seen.contains_key(key)
    }
}
