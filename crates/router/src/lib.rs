//! # Nebula Router
//!
//! The cross-workflow event router (C8, §4.7): matches events emitted by
//! one workflow's run against declared links and triggers matching target
//! workflows. Routing never fails the emitting caller; delivery failures
//! are logged and the first one is surfaced for observability.

mod link;
mod router;

pub use link::CrossWorkflowLink;
pub use router::{CrossWorkflowRouter, EngineHandle, InMemoryLinkStore, LinkStore};
