//! # Nebula Config
//!
//! Typed representation of the declarative YAML config (§3 "Module
//! descriptor" / "Workflow descriptor" / "Trigger descriptor" / "Pipeline
//! step", §6 "YAML config"), plus the environment/flag precedence rules
//! from §6 that feed the CLI.
//!
//! This crate only models and loads configuration; resolving it into a
//! running graph is `nebula-engine`'s job (C4).

mod descriptor;
mod graph;
mod settings;

pub use descriptor::{
    EngineConfig, ModuleDescriptor, PipelineStep, TriggerDescriptor, WorkflowDescriptor,
};
pub use graph::validate_module_graph;
pub use settings::{EnvSource, Flags, Settings};

use nebula_error::ConfigError;

/// Parse a YAML document into an [`EngineConfig`].
///
/// Does not validate references or acyclicity — that happens once the
/// engine has the registries needed to resolve factory keys (C4 step 4).
/// This function only validates that the document is well-formed YAML
/// matching the descriptor shapes, and that module names are unique and
/// their `dependsOn` graph is acyclic (§3 invariant), since both checks
/// are self-contained within the config document.
pub fn parse_yaml(source: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = serde_yaml::from_str(source).map_err(|err| ConfigError::UnresolvedReference {
        from: "<document root>".to_owned(),
        to: err.to_string(),
    })?;

    check_duplicate_names(&config)?;
    validate_module_graph(&config.modules)?;

    Ok(config)
}

fn check_duplicate_names(config: &EngineConfig) -> Result<(), ConfigError> {
    let mut seen = std::collections::HashSet::new();
    for name in config.modules.iter().map(|m| &m.name) {
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateName { name: name.clone() });
        }
    }
    let mut seen = std::collections::HashSet::new();
    for key in config.workflows.iter().map(|w| &w.key) {
        if !seen.insert(key.clone()) {
            return Err(ConfigError::DuplicateName { name: key.clone() });
        }
    }
    let mut seen = std::collections::HashSet::new();
    for key in config.triggers.iter().map(|t| &t.key) {
        if !seen.insert(key.clone()) {
            return Err(ConfigError::DuplicateName { name: key.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = r"
modules:
  - name: queue
    type: memory_queue
    config: {}
workflows:
  - key: order-pipeline
    type: pipeline
    steps: []
    entry: validate
triggers:
  - key: order-webhook
    type: http
    module: queue
";
        let config = parse_yaml(yaml).unwrap();
        assert_eq!(config.modules.len(), 1);
        assert_eq!(config.workflows.len(), 1);
        assert_eq!(config.triggers.len(), 1);
    }

    #[test]
    fn rejects_duplicate_module_names() {
        let yaml = r"
modules:
  - name: queue
    type: memory_queue
    config: {}
  - name: queue
    type: memory_queue
    config: {}
";
        let err = parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { .. }));
    }

    #[test]
    fn rejects_cyclic_module_dependencies() {
        let yaml = r"
modules:
  - name: a
    type: t
    config: {}
    dependsOn: [b]
  - name: b
    type: t
    config: {}
    dependsOn: [a]
";
        let err = parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::CyclicDependency { .. }));
    }
}
