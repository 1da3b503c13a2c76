//! The [`Service`] contract and its `Init`/`Start`/`Stop` lifecycle.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use nebula_error::Result;

/// A named, dependency-aware unit the [`crate::Application`] manages.
///
/// `requires()` names other registered services that must complete `Init`
/// before this one's `Init` runs, and `Start` before this one's `Start`
/// runs (§4.2). A service with no dependencies returns an empty slice.
#[async_trait]
pub trait Service: Any + Send + Sync {
    fn name(&self) -> &str;

    fn requires(&self) -> &[&str] {
        &[]
    }

    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    /// Upcast to `Arc<dyn Any>` so [`crate::Application::get_service`] can
    /// downcast back to the concrete type. Implementations should always
    /// write `{ self }`.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Alias used where a call site wants to emphasize the lifecycle-only
/// aspect of [`Service`] rather than its naming/dependency identity.
pub use Service as Lifecycle;
