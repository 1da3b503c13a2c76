//! Contract registry: `name → FieldContract`, safe for concurrent access
//! (§4.4 "Contract registry").

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::contract::FieldContract;

#[derive(Default)]
pub struct ContractRegistry {
    entries: RwLock<HashMap<String, FieldContract>>,
}

impl ContractRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, name: impl Into<String>, contract: FieldContract) {
        self.entries.write().insert(name.into(), contract);
    }

    pub fn unregister(&self, name: &str) {
        self.entries.write().remove(name);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldContract> {
        self.entries.read().get(name).cloned()
    }
}
