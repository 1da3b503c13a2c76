//! The component contract and its managed, panic-recovering lifecycle
//! wrapper (§4.4 "Component contract").

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nebula_error::SandboxError;
use parking_lot::RwLock;
use serde_json::Value;

use crate::contract::FieldContract;
use crate::state::ComponentState;

/// A user-supplied component. Every entry point except `execute` is a
/// no-op by default; an absent `execute` fails calls with
/// [`SandboxError::NoExecute`]. Implementations do not need to catch their
/// own panics — [`ManagedComponent`] wraps every call.
#[async_trait]
pub trait Component: Send + Sync {
    fn name(&self) -> String;

    async fn init(&self, _services: HashMap<String, Value>) -> Result<(), SandboxError> {
        Ok(())
    }

    async fn start(&self) -> Result<(), SandboxError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), SandboxError> {
        Ok(())
    }

    async fn execute(&self, _params: Value) -> Result<Value, SandboxError> {
        Err(SandboxError::NoExecute { component: self.name() })
    }

    /// Field contract, if this component declares one (§2, §4.4).
    fn contract(&self) -> Option<FieldContract> {
        None
    }
}

/// Wraps a loaded [`Component`] with its lifecycle state and panic
/// recovery. All entry-point calls run on a spawned task so a panic
/// inside user code surfaces as [`SandboxError::ComponentPanic`] instead
/// of taking down the caller.
pub struct ManagedComponent {
    id: String,
    inner: Arc<dyn Component>,
    state: RwLock<ComponentState>,
}

impl ManagedComponent {
    #[must_use]
    pub fn new(id: impl Into<String>, inner: Arc<dyn Component>) -> Self {
        Self { id, inner, state: RwLock::new(ComponentState::Loaded) }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> ComponentState {
        *self.state.read()
    }

    #[must_use]
    pub fn contract(&self) -> Option<FieldContract> {
        self.inner.contract()
    }

    pub async fn init(&self, services: HashMap<String, Value>) -> Result<(), SandboxError> {
        let inner = Arc::clone(&self.inner);
        let result = guarded(async move { inner.init(services).await }).await;
        self.transition(&result, ComponentState::Initialized);
        result
    }

    pub async fn start(&self) -> Result<(), SandboxError> {
        let inner = Arc::clone(&self.inner);
        let result = guarded(async move { inner.start().await }).await;
        self.transition(&result, ComponentState::Running);
        result
    }

    pub async fn stop(&self) -> Result<(), SandboxError> {
        let inner = Arc::clone(&self.inner);
        let result = guarded(async move { inner.stop().await }).await;
        self.transition(&result, ComponentState::Stopped);
        result
    }

    pub async fn execute(&self, params: Value) -> Result<Value, SandboxError> {
        let inner = Arc::clone(&self.inner);
        let result = guarded(async move { inner.execute(params).await }).await;
        if result.is_err() {
            *self.state.write() = ComponentState::Error;
        }
        result
    }

    fn transition<T>(&self, result: &Result<T, SandboxError>, on_success: ComponentState) {
        let mut state = self.state.write();
        *state = if result.is_ok() { on_success } else { ComponentState::Error };
    }
}

async fn guarded<T, Fut>(fut: Fut) -> Result<T, SandboxError>
where
    T: Send + 'static,
    Fut: std::future::Future<Output = Result<T, SandboxError>> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(result) => result,
        Err(join_err) => {
            let message = if join_err.is_panic() {
                panic_message(join_err.into_panic())
            } else {
                "component task was cancelled".to_owned()
            };
            Err(SandboxError::ComponentPanic { message })
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "component panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Component for Echo {
        fn name(&self) -> String {
            "echo".to_owned()
        }

        async fn execute(&self, params: Value) -> Result<Value, SandboxError> {
            Ok(params)
        }
    }

    struct Panics;

    #[async_trait]
    impl Component for Panics {
        fn name(&self) -> String {
            "panics".to_owned()
        }

        async fn execute(&self, _params: Value) -> Result<Value, SandboxError> {
            panic!("boom")
        }
    }

    struct NoExecute;

    #[async_trait]
    impl Component for NoExecute {
        fn name(&self) -> String {
            "silent".to_owned()
        }
    }

    #[tokio::test]
    async fn a_fresh_component_starts_loaded() {
        let managed = ManagedComponent::new("echo-1", Arc::new(Echo));
        assert_eq!(managed.state(), crate::state::ComponentState::Loaded);
    }

    #[tokio::test]
    async fn successful_lifecycle_transitions_through_each_state() {
        let managed = ManagedComponent::new("echo-1", Arc::new(Echo));
        managed.init(HashMap::new()).await.unwrap();
        assert_eq!(managed.state(), crate::state::ComponentState::Initialized);
        managed.start().await.unwrap();
        assert_eq!(managed.state(), crate::state::ComponentState::Running);
        managed.stop().await.unwrap();
        assert_eq!(managed.state(), crate::state::ComponentState::Stopped);
    }

    #[tokio::test]
    async fn a_panic_in_execute_becomes_a_typed_error() {
        let managed = ManagedComponent::new("panics-1", Arc::new(Panics));
        let err = managed.execute(Value::Null).await.unwrap_err();
        assert!(matches!(err, SandboxError::ComponentPanic { .. }));
        assert_eq!(managed.state(), crate::state::ComponentState::Error);
    }

    #[tokio::test]
    async fn execute_without_an_override_fails_with_no_execute() {
        let managed = ManagedComponent::new("silent-1", Arc::new(NoExecute));
        let err = managed.execute(Value::Null).await.unwrap_err();
        assert!(matches!(err, SandboxError::NoExecute { .. }));
    }
}
