//! # Nebula Workflow
//!
//! Resolves a [`WorkflowDescriptor`]'s `pipeline` handler body into a
//! walkable step graph, and checks the invariants `nebula-config` leaves
//! to the engine: every `next` name must exist, `entry` must exist if set,
//! and the `next` chain must not cycle (§3 "Pipeline step" / §4.5).

mod graph;

pub use graph::StepGraph;

use nebula_config::{PipelineStep, WorkflowDescriptor};
use nebula_error::ConfigError;

/// A workflow resolved to its step graph, ready for `nebula-execution` to
/// walk.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    pub key: String,
    pub steps: Vec<PipelineStep>,
    pub entry: Option<String>,
}

impl WorkflowDefinition {
    /// Build and validate a [`WorkflowDefinition`] from a raw descriptor.
    /// Only meaningful for the built-in `pipeline` handler type — other
    /// handler types own their own `body` shape and skip this validation.
    pub fn resolve(descriptor: &WorkflowDescriptor) -> Result<Self, ConfigError> {
        let def = Self {
            key: descriptor.key.clone(),
            steps: descriptor.steps.clone(),
            entry: descriptor.entry.clone(),
        };
        StepGraph::build(&def.steps, def.entry.as_deref())?;
        Ok(def)
    }

    #[must_use]
    pub fn graph(&self) -> StepGraph<'_> {
        StepGraph::build(&self.steps, self.entry.as_deref())
            .expect("validated in resolve")
    }
}
