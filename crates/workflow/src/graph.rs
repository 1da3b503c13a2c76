//! The `next`-linked step chain, validated and made walkable.

use std::collections::HashMap;

use nebula_config::PipelineStep;
use nebula_error::ConfigError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// Validated view over a workflow's steps, indexed by name.
pub struct StepGraph<'a> {
    steps: HashMap<&'a str, &'a PipelineStep>,
    entry: Option<&'a str>,
}

impl<'a> StepGraph<'a> {
    /// Validate that `entry` (if set) and every `next` reference a step
    /// present in `steps`, and that the `next` chain is acyclic.
    pub fn build(steps: &'a [PipelineStep], entry: Option<&'a str>) -> Result<Self, ConfigError> {
        let by_name: HashMap<&str, &PipelineStep> =
            steps.iter().map(|s| (s.name.as_str(), s)).collect();

        if let Some(entry) = entry {
            if !by_name.contains_key(entry) {
                return Err(ConfigError::UnresolvedReference {
                    from: "entry".to_owned(),
                    to: entry.to_owned(),
                });
            }
        }

        let mut graph = DiGraph::<&str, ()>::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for step in steps {
            index.insert(step.name.as_str(), graph.add_node(step.name.as_str()));
        }
        for step in steps {
            let Some(next) = step.next.as_deref() else { continue };
            let Some(&to) = index.get(next) else {
                return Err(ConfigError::UnresolvedReference {
                    from: step.name.clone(),
                    to: next.to_owned(),
                });
            };
            let from = index[step.name.as_str()];
            graph.add_edge(from, to, ());
        }

        if let Err(cycle) = toposort(&graph, None) {
            let name = graph[cycle.node_id()].to_owned();
            return Err(ConfigError::CyclicDependency { cycle: vec![name] });
        }

        Ok(Self { steps: by_name, entry })
    }

    #[must_use]
    pub fn step(&self, name: &str) -> Option<&PipelineStep> {
        self.steps.get(name).copied()
    }

    #[must_use]
    pub fn entry(&self) -> Option<&str> {
        self.entry
    }

    /// Follow `next` from `entry` to the end of the chain, in order.
    #[must_use]
    pub fn walk_from_entry(&self) -> Vec<&PipelineStep> {
        let mut out = Vec::new();
        let mut current = self.entry;
        while let Some(name) = current {
            let Some(step) = self.steps.get(name) else { break };
            out.push(*step);
            current = step.next.as_deref();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn step(name: &str, next: Option<&str>) -> PipelineStep {
        PipelineStep {
            name: name.to_owned(),
            type_name: "noop".to_owned(),
            config: Value::Null,
            next: next.map(str::to_owned),
            skip_on_error: false,
        }
    }

    #[test]
    fn walk_from_entry_follows_the_next_chain() {
        let steps = vec![step("a", Some("b")), step("b", Some("c")), step("c", None)];
        let graph = StepGraph::build(&steps, Some("a")).unwrap();
        let names: Vec<&str> = graph.walk_from_entry().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn walk_from_entry_is_empty_without_an_entry() {
        let steps = vec![step("a", None)];
        let graph = StepGraph::build(&steps, None).unwrap();
        assert!(graph.walk_from_entry().is_empty());
    }
}
