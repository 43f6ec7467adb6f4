//! Nodos del grafo y aristas tipadas.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::injection::with_field;
use crate::policy::{CatchRule, RetryRule};
use crate::step::StepDefinition;

/// Arista de salida normal de un Task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Next(String),
    /// El Task es terminal: la ejecución termina con éxito.
    End,
}

/// Dónde queda el resultado de un Task exitoso.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultPath {
    /// El output reemplaza al payload (contrato por defecto).
    #[default]
    Replace,
    /// El output se guarda en un campo del payload de entrada.
    Field(String),
    /// Se descarta el output; el payload de entrada sigue intacto.
    Discard,
}

impl ResultPath {
    pub fn apply(&self, input: &Value, output: Value) -> Value {
        match self {
            ResultPath::Replace => output,
            ResultPath::Field(f) => with_field(input, f, output),
            ResultPath::Discard => input.clone(),
        }
    }

    fn describe(&self) -> Value {
        match self {
            ResultPath::Replace => json!("$"),
            ResultPath::Field(f) => json!(format!("$.{f}")),
            ResultPath::Discard => Value::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskState {
    pub step: Arc<dyn StepDefinition>,
    pub next: Edge,
    pub retry: Vec<RetryRule>,
    pub catch: Vec<CatchRule>,
    pub timeout: Option<Duration>,
    pub result_path: ResultPath,
}

impl TaskState {
    pub fn new(step: Arc<dyn StepDefinition>) -> Self {
        Self { step,
               next: Edge::End,
               retry: Vec::new(),
               catch: Vec::new(),
               timeout: None,
               result_path: ResultPath::Replace }
    }

    pub fn next(mut self, state: impl Into<String>) -> Self {
        self.next = Edge::Next(state.into());
        self
    }

    pub fn end(mut self) -> Self {
        self.next = Edge::End;
        self
    }

    pub fn retry(mut self, rule: RetryRule) -> Self {
        self.retry.push(rule);
        self
    }

    /// Las reglas se evalúan en el orden en que se agregan.
    pub fn catch(mut self, rule: CatchRule) -> Self {
        self.catch.push(rule);
        self
    }

    pub fn catch_all_of(mut self, rules: impl IntoIterator<Item = CatchRule>) -> Self {
        self.catch.extend(rules);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn result_path(mut self, path: ResultPath) -> Self {
        self.result_path = path;
        self
    }
}

/// Predicado de un nodo de decisión, evaluado contra el input original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Campo booleano igual a `value`. `field` es un nombre de primer nivel o
    /// un JSON pointer (`/a/b`). Si falta o no es booleano el predicado es
    /// falso.
    BooleanEquals { field: String, value: bool },
}

impl Predicate {
    pub fn boolean_equals(field: impl Into<String>, value: bool) -> Self {
        Predicate::BooleanEquals { field: field.into(),
                                   value }
    }

    pub fn evaluate(&self, input: &Value) -> bool {
        match self {
            Predicate::BooleanEquals { field, value } => {
                let found = if field.starts_with('/') {
                    input.pointer(field)
                } else {
                    input.get(field)
                };
                found.and_then(Value::as_bool).map(|b| b == *value).unwrap_or(false)
            }
        }
    }

    fn describe(&self) -> Value {
        match self {
            Predicate::BooleanEquals { field, value } => json!({ "Variable": field, "BooleanEquals": value }),
        }
    }
}

/// Arista condicional: `when_true` si el predicado se cumple, si no `when_false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceState {
    pub predicate: Predicate,
    pub when_true: String,
    pub when_false: String,
}

impl ChoiceState {
    pub fn new(predicate: Predicate, when_true: impl Into<String>, when_false: impl Into<String>) -> Self {
        Self { predicate,
               when_true: when_true.into(),
               when_false: when_false.into() }
    }

    pub fn target(&self, value: bool) -> &str {
        if value {
            &self.when_true
        } else {
            &self.when_false
        }
    }
}

#[derive(Debug, Clone)]
pub enum StateNode {
    Task(TaskState),
    Choice(ChoiceState),
    Succeed,
}

impl StateNode {
    pub fn type_name(&self) -> &'static str {
        match self {
            StateNode::Task(_) => "Task",
            StateNode::Choice(_) => "Choice",
            StateNode::Succeed => "Succeed",
        }
    }

    pub(crate) fn describe(&self) -> Value {
        match self {
            StateNode::Task(t) => {
                let mut v = json!({
                    "Type": "Task",
                    "Resource": t.step.id(),
                    "Retry": t.retry.iter().map(RetryRule::describe).collect::<Vec<_>>(),
                    "Catch": t.catch.iter().map(CatchRule::describe).collect::<Vec<_>>(),
                    "TimeoutSeconds": t.timeout.map(|d| d.as_secs()),
                    "ResultPath": t.result_path.describe(),
                });
                match &t.next {
                    Edge::Next(n) => v["Next"] = json!(n),
                    Edge::End => v["End"] = json!(true),
                }
                v
            }
            StateNode::Choice(c) => json!({
                "Type": "Choice",
                "Choices": [ { "Condition": c.predicate.describe(), "Next": c.when_true } ],
                "Default": c.when_false,
            }),
            StateNode::Succeed => json!({ "Type": "Succeed" }),
        }
    }
}
