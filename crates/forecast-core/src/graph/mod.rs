//! Grafo del workflow: nodos con nombre y aristas tipadas.
//!
//! El grafo se construye explícitamente con `GraphBuilder` y pasa por una
//! validación antes de poder ejecutarse; no hay estado mutable de
//! encadenamiento oculto.

mod builder;
mod state;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::hashing::hash_value;

pub use builder::GraphBuilder;
pub use state::{ChoiceState, Edge, Predicate, ResultPath, StateNode, TaskState};

/// Tipo de arista para inspección (CLI, validación).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Normal,
    ConditionalTrue,
    ConditionalFalse,
    Catch(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub kind: EdgeKind,
}

/// Grafo validado e inmutable.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    start: String,
    states: IndexMap<String, StateNode>,
    definition_hash: String,
}

impl WorkflowGraph {
    pub(crate) fn new(start: String, states: IndexMap<String, StateNode>) -> Self {
        let mut g = Self { start,
                           states,
                           definition_hash: String::new() };
        g.definition_hash = hash_value(&g.describe());
        g
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn state(&self, name: &str) -> Option<&StateNode> {
        self.states.get(name)
    }

    /// Estados en orden de declaración.
    pub fn states(&self) -> impl Iterator<Item = (&str, &StateNode)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn edges(&self) -> Vec<EdgeRef<'_>> {
        let mut out = Vec::new();
        for (name, node) in &self.states {
            match node {
                StateNode::Task(t) => {
                    if let Edge::Next(n) = &t.next {
                        out.push(EdgeRef { from: name,
                                           to: n,
                                           kind: EdgeKind::Normal });
                    }
                    for (i, c) in t.catch.iter().enumerate() {
                        out.push(EdgeRef { from: name,
                                           to: &c.next,
                                           kind: EdgeKind::Catch(i) });
                    }
                }
                StateNode::Choice(c) => {
                    out.push(EdgeRef { from: name,
                                       to: &c.when_true,
                                       kind: EdgeKind::ConditionalTrue });
                    out.push(EdgeRef { from: name,
                                       to: &c.when_false,
                                       kind: EdgeKind::ConditionalFalse });
                }
                StateNode::Succeed => {}
            }
        }
        out
    }

    /// Descripción JSON estable (estilo ASL) usada para hashing y para el CLI.
    pub fn describe(&self) -> Value {
        let states: Map<String, Value> = self.states.iter().map(|(k, v)| (k.clone(), v.describe())).collect();
        json!({ "StartAt": self.start, "States": states })
    }
}
