//! # Nebula Sandbox
//!
//! Validates, compiles, and hosts user-supplied components under fixed
//! resource caps and field contracts (C5, §4.4).

mod component;
mod contract;
mod enforcement;
mod imports;
mod pool;
mod registry;
mod state;
mod watcher;

pub use component::{Component, ManagedComponent};
pub use contract::{FieldContract, FieldSpec, FieldType};
pub use enforcement::{execute_with_limits, Limits};
pub use imports::{validate_source, ALLOWED, BLOCKED};
pub use pool::{InterpreterFactory, InterpreterPool};
pub use registry::ContractRegistry;
pub use state::ComponentState;
pub use watcher::{WatchEvent, Watcher};
