//! Generic keyed factory map shared by the typed registries in [`crate`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// A thread-safe map from string key to factory value.
///
/// Registration is idempotent by key: calling [`register`](Self::register)
/// twice with the same key keeps only the most recent factory. This lets a
/// module type be redefined (e.g. during a hot reload) without first
/// unregistering it.
pub struct FactoryRegistry<F> {
    entries: RwLock<HashMap<String, F>>,
}

impl<F> fmt::Debug for FactoryRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("keys", &self.entries.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<F: Clone> FactoryRegistry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    /// Register (or replace) the factory for `key`.
    pub fn register(&self, key: impl Into<String>, factory: F) {
        self.entries.write().insert(key.into(), factory);
    }

    /// Look up the factory registered for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<F> {
        self.entries.read().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl<F: Clone> Default for FactoryRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_key_returns_none() {
        let registry: FactoryRegistry<i32> = FactoryRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn register_then_get_roundtrips() {
        let registry = FactoryRegistry::new();
        registry.register("a", 1);
        assert_eq!(registry.get("a"), Some(1));
    }

    #[test]
    fn last_registration_wins() {
        let registry = FactoryRegistry::new();
        registry.register("a", 1);
        registry.register("a", 2);
        assert_eq!(registry.get("a"), Some(2));
    }

    #[test]
    fn keys_lists_all_registered_entries() {
        let registry = FactoryRegistry::new();
        registry.register("a", 1);
        registry.register("b", 2);
        let mut keys = registry.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_owned(), "b".to_owned()]);
    }
}
