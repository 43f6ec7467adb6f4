#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use forecast_core::{StepDefinition, StepError, StepKind};
use serde_json::{json, Map, Value};
use tokio::time::Instant;

/// Step de prueba con respuestas guionadas. Cuando el guion se agota
/// devuelve `{ "<id>": "ok" }`.
#[derive(Debug)]
pub struct ScriptedStep {
    id: String,
    kind: StepKind,
    script: Mutex<VecDeque<Result<Value, StepError>>>,
    calls: Mutex<Vec<(Instant, Value)>>,
}

impl ScriptedStep {
    pub fn ok(id: &str) -> Arc<Self> {
        Self::scripted(id, Vec::new())
    }

    pub fn scripted(id: &str, script: Vec<Result<Value, StepError>>) -> Arc<Self> {
        Arc::new(Self { id: id.to_string(),
                        kind: StepKind::Provision,
                        script: Mutex::new(script.into()),
                        calls: Mutex::new(Vec::new()) })
    }

    pub fn always(id: &str, err: StepError, times: usize) -> Arc<Self> {
        Self::scripted(id, (0..times).map(|_| Err(err.clone())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    /// Separación entre llamadas consecutivas, en milisegundos.
    pub fn gaps_ms(&self) -> Vec<u128> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| (w[1].0 - w[0].0).as_millis()).collect()
    }
}

#[async_trait]
impl StepDefinition for ScriptedStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StepKind {
        self.kind
    }

    async fn invoke(&self, payload: Value) -> Result<Value, StepError> {
        self.calls.lock().unwrap().push((Instant::now(), payload.clone()));
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
                let mut out = Map::new();
                out.insert(self.id.clone(), json!("ok"));
                Ok(Value::Object(out))
            })
    }
}

pub fn pending() -> StepError {
    StepError::transient("ResourcePendingException", "still in progress")
}

pub fn failed() -> StepError {
    StepError::terminal("ResourceFailedException", "resource failed")
}
