//! # Nebula Engine
//!
//! Given a config, produce a running graph (C4, §4.3): instantiates
//! modules via C2 and registers them with C3, resolves each workflow's
//! handler, links triggers to the workflows they fire, and validates
//! every reference before anything starts. [`Manager`] drives the
//! `Start`/`Stop`/`Reload` lifecycle on top of the immutable [`Engine`]
//! a build produces.

mod builtin;
mod engine;
mod handler;
mod manager;
mod module;
mod registries;
mod trigger;

pub use builtin::{PipelineHandlerFactory, SwappableRecorder};
pub use engine::Engine;
pub use handler::{WorkflowHandler, WorkflowHandlerFactory};
pub use manager::Manager;
pub use module::ModuleFactory;
pub use registries::EngineRegistries;
pub use trigger::TriggerFactory;
