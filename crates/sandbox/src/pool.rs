//! Interpreter pool (§4.4 "Interpreter pool").
//!
//! Interpreter creation is not thread-safe in the reference runtimes this
//! sandbox hosts (the allow-listed symbol table is installed into a
//! fresh, single-owner interpreter instance), so pool access is
//! serialized behind a mutex rather than sharded like the other
//! registries in this crate.

use std::sync::Arc;

use nebula_error::SandboxError;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::component::Component;

/// Builds a fresh component instance for a given type key, installing
/// only the allow-listed symbols (§4.4).
pub type InterpreterFactory = Arc<dyn Fn() -> Result<Arc<dyn Component>, SandboxError> + Send + Sync>;

/// Owns the set of known interpreter factories. `create` is mutex-guarded
/// end to end so two concurrent loads never race inside the same
/// interpreter runtime.
pub struct InterpreterPool {
    factories: Mutex<HashMap<String, InterpreterFactory>>,
}

impl InterpreterPool {
    #[must_use]
    pub fn new() -> Self {
        Self { factories: Mutex::new(HashMap::new()) }
    }

    pub fn register(&self, type_name: impl Into<String>, factory: InterpreterFactory) {
        self.factories.lock().insert(type_name.into(), factory);
    }

    /// Create a new component instance of `type_name`. Held under the same
    /// lock as `register` so creation never overlaps.
    pub fn create(&self, type_name: &str) -> Result<Arc<dyn Component>, SandboxError> {
        let factories = self.factories.lock();
        let factory = factories.get(type_name).ok_or_else(|| SandboxError::InterpreterError {
            reason: format!("no interpreter factory registered for type '{type_name}'"),
        })?;
        factory()
    }
}

impl Default for InterpreterPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Component for Noop {
        fn name(&self) -> String {
            "noop".to_owned()
        }
    }

    #[test]
    fn create_uses_the_registered_factory() {
        let pool = InterpreterPool::new();
        pool.register("noop", Arc::new(|| Ok(Arc::new(Noop) as Arc<dyn Component>)));
        let component = pool.create("noop").unwrap();
        assert_eq!(component.name(), "noop");
    }

    #[test]
    fn create_fails_for_an_unregistered_type() {
        let pool = InterpreterPool::new();
        let err = pool.create("missing").unwrap_err();
        assert!(matches!(err, SandboxError::InterpreterError { .. }));
    }

    #[test]
    fn a_factory_error_propagates_from_create() {
        let pool = InterpreterPool::new();
        pool.register(
            "broken",
            Arc::new(|| Err(SandboxError::InterpreterError { reason: "boom".to_owned() })),
        );
        let err = pool.create("broken").unwrap_err();
        assert!(matches!(err, SandboxError::InterpreterError { .. }));
    }
}
