//! Config-time errors (§7 "Config errors").
//!
//! All variants are fatal for the build in progress: the engine discards
//! partial state and returns one of these, naming the offending descriptor.

/// Errors raised while resolving a config into a running graph (C4 `BuildFromConfig`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown module type `{type_name}` (module `{module_name}`)")]
    UnknownModuleType {
        module_name: String,
        type_name: String,
    },

    #[error("unknown step type `{type_name}` (step `{step_name}`)")]
    UnknownStepType { step_name: String, type_name: String },

    #[error("unknown trigger type `{type_name}` (trigger `{trigger_key}`)")]
    UnknownTriggerType {
        trigger_key: String,
        type_name: String,
    },

    #[error("unknown workflow handler type `{handler_type}` (workflow `{workflow_key}`)")]
    UnknownHandlerType {
        workflow_key: String,
        handler_type: String,
    },

    #[error("duplicate name `{name}`")]
    DuplicateName { name: String },

    #[error("unresolved reference from `{from}` to `{to}`")]
    UnresolvedReference { from: String, to: String },

    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}
