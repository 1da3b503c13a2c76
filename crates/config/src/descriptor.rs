//! The typed config document shape (§3, §6 "YAML config").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level config document: `{modules, triggers, workflows}` (§6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub triggers: Vec<TriggerDescriptor>,
    #[serde(default)]
    pub workflows: Vec<WorkflowDescriptor>,
}

/// `{name (unique within config), type (factory key), config (free-form
/// map), dependsOn (list of module names)}` (§3 "Module descriptor").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default, rename = "dependsOn")]
    pub depends_on: Vec<String>,
}

/// `{key, handlerType, body (handler-specific map)}` (§3 "Workflow
/// descriptor"). `body` carries the pipeline's `steps`/`entry` for the
/// built-in `pipeline` handler, or whatever shape a custom handler needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDescriptor {
    pub key: String,
    #[serde(rename = "type")]
    pub handler_type: String,
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub body: Value,
}

/// `{key, type, body}` (§3 "Trigger descriptor").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub key: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub body: Value,
}

/// `{name, type, config, next (optional name)}` (§3 "Pipeline step").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub next: Option<String>,
    /// If `true`, a failure in this step does not fail the whole execution
    /// (§4.5 item 2).
    #[serde(default, rename = "skipOnError")]
    pub skip_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_step_defaults_skip_on_error_to_false() {
        let yaml = "name: validate\ntype: validator\n";
        let step: PipelineStep = serde_yaml::from_str(yaml).unwrap();
        assert!(!step.skip_on_error);
        assert!(step.next.is_none());
    }

    #[test]
    fn module_descriptor_defaults_depends_on_to_empty() {
        let yaml = "name: queue\ntype: memory_queue\n";
        let module: ModuleDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert!(module.depends_on.is_empty());
    }
}
