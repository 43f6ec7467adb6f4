use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use forecast_core::injection::merge_json;
use forecast_core::StepError;
use forecast_policies::{RESOURCE_FAILED, RESOURCE_PENDING};
use log::debug;
use serde_json::{json, Value};

use super::StepInvoker;
use crate::config::PipelineConfig;
use crate::pipeline::{CREATE_PREDICTOR, DELETE_PREDICTOR, IMPORT_DATA};

/// Escenarios predefinidos para ejecutar el pipeline sin backend remoto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Todas las funciones responden al primer intento.
    Happy,
    /// `ImportData` reporta pendiente tres veces antes de completar.
    SlowImport,
    /// `CreatePredictor` falla de forma terminal.
    PredictorFailed,
    /// `DeletePredictor` falla de forma terminal.
    DeletionFailed,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::Happy,
                                    Scenario::SlowImport,
                                    Scenario::PredictorFailed,
                                    Scenario::DeletionFailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Happy => "happy",
            Scenario::SlowImport => "slow-import",
            Scenario::PredictorFailed => "predictor-failed",
            Scenario::DeletionFailed => "deletion-failed",
        }
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL.into_iter()
                     .find(|sc| sc.as_str() == s)
                     .ok_or_else(|| format!("unknown scenario '{s}'"))
    }
}

/// Invoker en memoria con respuestas guionadas por función.
///
/// Sin guion (o con el guion agotado) la función responde con el payload de
/// entrada más `{"<función>Arn": "arn:sim:<función>"}`.
#[derive(Debug, Default)]
pub struct SimulatedInvoker {
    scripts: Mutex<HashMap<String, VecDeque<Result<Value, StepError>>>>,
    calls: Mutex<Vec<String>>,
}

impl SimulatedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_scenario(scenario: Scenario, cfg: &PipelineConfig) -> Self {
        let inv = Self::new();
        match scenario {
            Scenario::Happy => {}
            Scenario::SlowImport => {
                let pending = StepError::transient(RESOURCE_PENDING, "import job CREATE_IN_PROGRESS");
                inv.script(&cfg.function_name(IMPORT_DATA), vec![Err(pending.clone()), Err(pending.clone()), Err(pending)]);
            }
            Scenario::PredictorFailed => {
                inv.script(&cfg.function_name(CREATE_PREDICTOR),
                           vec![Err(StepError::terminal(RESOURCE_FAILED, "predictor CREATE_FAILED"))]);
            }
            Scenario::DeletionFailed => {
                inv.script(&cfg.function_name(DELETE_PREDICTOR),
                           vec![Err(StepError::terminal(RESOURCE_FAILED, "predictor DELETE_FAILED"))]);
            }
        }
        inv
    }

    /// Agrega respuestas al guion de `function`.
    pub fn script(&self, function: &str, responses: Vec<Result<Value, StepError>>) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.entry(function.to_string()).or_default().extend(responses);
        }
    }

    /// Funciones invocadas, en orden.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, function: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == function).count()
    }
}

#[async_trait]
impl StepInvoker for SimulatedInvoker {
    async fn invoke(&self, function: &str, payload: Value) -> Result<Value, StepError> {
        debug!("simulated invoke {}", function);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(function.to_string());
        }
        let scripted = self.scripts
                           .lock()
                           .ok()
                           .and_then(|mut s| s.get_mut(function).and_then(VecDeque::pop_front));
        match scripted {
            Some(Ok(out)) => Ok(out),
            Some(Err(e)) => Err(e),
            None => Ok(merge_json(&payload, &json!({ format!("{function}Arn"): format!("arn:sim:{function}") }))),
        }
    }
}
