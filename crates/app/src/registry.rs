//! Name-to-service map backing [`crate::Application`].

use std::sync::Arc;

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::Service;

#[derive(Default)]
pub struct ServiceRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Service>>>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub(crate) fn insert(&mut self, name: String, service: Arc<dyn Service>) {
        self.entries.get_mut().insert(name, service);
    }

    /// Register (or replace) a service after construction, without
    /// touching the dependency order used by `Init`/`Start`/`Stop`.
    ///
    /// Used for services the server shell owns across a hot reload (the
    /// execution recorder, the v1 store, the event store) — they already
    /// run, so they only need to become visible to `get_service` lookups,
    /// not to join the lifecycle sequence (§4.3 "Hot reload" step 3).
    pub(crate) fn insert_external(&self, name: String, service: Arc<dyn Service>) {
        self.entries.write().insert(name, service);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    #[must_use]
    pub fn get_dyn(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.entries.read().get(name).cloned()
    }
}
