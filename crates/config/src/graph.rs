//! Acyclicity check for the module `dependsOn` graph (§3 invariant).

use nebula_error::ConfigError;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

use crate::descriptor::ModuleDescriptor;

/// Verify that `dependsOn` forms a DAG over module names.
///
/// References to names outside `modules` are ignored here — unresolved
/// references are caught separately once the module set is known to the
/// engine (they may reference a module registered by a different config
/// phase in tests). Returns [`ConfigError::CyclicDependency`] naming the
/// cycle in the order it was discovered.
pub fn validate_module_graph(modules: &[ModuleDescriptor]) -> Result<(), ConfigError> {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut index = HashMap::new();
    for module in modules {
        let idx = graph.add_node(module.name.as_str());
        index.insert(module.name.as_str(), idx);
    }
    for module in modules {
        let Some(&from) = index.get(module.name.as_str()) else {
            continue;
        };
        for dep in &module.depends_on {
            if let Some(&to) = index.get(dep.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let node = cycle.node_id();
        let name = graph[node].to_owned();
        return Err(ConfigError::CyclicDependency { cycle: vec![name] });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ModuleDescriptor;
    use serde_json::Value;

    fn module(name: &str, deps: &[&str]) -> ModuleDescriptor {
        ModuleDescriptor {
            name: name.to_owned(),
            type_name: "t".to_owned(),
            config: Value::Null,
            depends_on: deps.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn empty_graph_is_acyclic() {
        assert!(validate_module_graph(&[]).is_ok());
    }

    #[test]
    fn linear_chain_is_acyclic() {
        let modules = vec![module("a", &[]), module("b", &["a"]), module("c", &["b"])];
        assert!(validate_module_graph(&modules).is_ok());
    }

    #[test]
    fn self_cycle_is_rejected() {
        let modules = vec![module("a", &["a"])];
        assert!(validate_module_graph(&modules).is_err());
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let modules = vec![module("a", &["b"]), module("b", &["a"])];
        let err = validate_module_graph(&modules).unwrap_err();
        assert!(matches!(err, ConfigError::CyclicDependency { .. }));
    }

    #[test]
    fn dangling_reference_is_ignored_by_this_check() {
        // Resolved elsewhere (engine build phase); this check only cares
        // about cycles among names present in `modules`.
        let modules = vec![module("a", &["does-not-exist"])];
        assert!(validate_module_graph(&modules).is_ok());
    }
}
