use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StepError;

/// Un intento de invocación de un step dentro de una ejecución.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInvocation {
    pub state: String,
    pub payload: Value,
    /// 1 para la primera llamada.
    pub attempt: u32,
    pub last_error: Option<StepError>,
}

impl StepInvocation {
    pub fn first(state: impl Into<String>, payload: Value) -> Self {
        Self { state: state.into(),
               payload,
               attempt: 1,
               last_error: None }
    }

    /// Siguiente intento tras `error`; el payload no cambia entre reintentos.
    pub fn retry_after(&self, error: StepError) -> Self {
        Self { state: self.state.clone(),
               payload: self.payload.clone(),
               attempt: self.attempt + 1,
               last_error: Some(error) }
    }
}
