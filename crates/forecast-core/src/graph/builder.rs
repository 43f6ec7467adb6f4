//! Construcción explícita del grafo y pase de validación.
//!
//! ```ignore
//! let graph = GraphBuilder::new().start_at("A")
//!                                .task("A", TaskState::new(step_a).next("Branch"))
//!                                .choice("Branch", ChoiceState::new(pred, "B", "Done"))
//!                                .task("B", TaskState::new(step_b).next("Done"))
//!                                .succeed("Done")
//!                                .build()?;
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use log::warn;

use super::{ChoiceState, Edge, StateNode, TaskState, WorkflowGraph};
use crate::errors::CoreEngineError;

#[derive(Debug, Default)]
pub struct GraphBuilder {
    start: Option<String>,
    states: Vec<(String, StateNode)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_at(mut self, state: impl Into<String>) -> Self {
        self.start = Some(state.into());
        self
    }

    pub fn task(mut self, name: impl Into<String>, task: TaskState) -> Self {
        self.states.push((name.into(), StateNode::Task(task)));
        self
    }

    pub fn choice(mut self, name: impl Into<String>, choice: ChoiceState) -> Self {
        self.states.push((name.into(), StateNode::Choice(choice)));
        self
    }

    pub fn succeed(mut self, name: impl Into<String>) -> Self {
        self.states.push((name.into(), StateNode::Succeed));
        self
    }

    /// Valida y congela el grafo.
    pub fn build(self) -> Result<WorkflowGraph, CoreEngineError> {
        let invalid = |msg: String| CoreEngineError::InvalidGraph(msg);

        let start = self.start.ok_or_else(|| invalid("missing start state".into()))?;
        let mut states: IndexMap<String, StateNode> = IndexMap::with_capacity(self.states.len());
        for (name, node) in self.states {
            if states.contains_key(&name) {
                return Err(invalid(format!("duplicate state '{name}'")));
            }
            states.insert(name, node);
        }
        if !states.contains_key(&start) {
            return Err(invalid(format!("start state '{start}' not declared")));
        }

        let exists = |target: &str, from: &str| -> Result<(), CoreEngineError> {
            if states.contains_key(target) {
                Ok(())
            } else {
                Err(CoreEngineError::InvalidGraph(format!("state '{from}' points to unknown state '{target}'")))
            }
        };

        for (name, node) in &states {
            match node {
                StateNode::Task(t) => {
                    if let Edge::Next(n) = &t.next {
                        exists(n, name)?;
                    }
                    for (i, r) in t.retry.iter().enumerate() {
                        r.validate().map_err(|e| invalid(format!("state '{name}' retry #{i}: {e}")))?;
                    }
                    for (i, c) in t.catch.iter().enumerate() {
                        if c.matchers.is_empty() {
                            return Err(invalid(format!("state '{name}' catch #{i} has no error matchers")));
                        }
                        if c.is_catch_all() && i + 1 != t.catch.len() {
                            return Err(invalid(format!("state '{name}': catch-all must be the last catch rule")));
                        }
                        exists(&c.next, name)?;
                    }
                }
                StateNode::Choice(ChoiceState { when_true, when_false, .. }) => {
                    exists(when_true, name)?;
                    exists(when_false, name)?;
                }
                StateNode::Succeed => {}
            }
        }

        let graph = WorkflowGraph::new(start, states);
        for name in unreachable_states(&graph) {
            warn!("state '{name}' is not reachable from '{}'", graph.start());
        }
        Ok(graph)
    }
}

fn unreachable_states(graph: &WorkflowGraph) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack = vec![graph.start()];
    let edges = graph.edges();
    while let Some(s) = stack.pop() {
        if !seen.insert(s) {
            continue;
        }
        stack.extend(edges.iter().filter(|e| e.from == s).map(|e| e.to));
    }
    graph.states()
         .filter(|(n, _)| !seen.contains(n))
         .map(|(n, _)| n.to_string())
         .collect()
}
