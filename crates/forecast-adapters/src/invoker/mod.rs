//! Invocación de funciones remotas y clasificación de sus errores.

mod http;
mod simulated;

use async_trait::async_trait;
use forecast_core::StepError;
use forecast_policies::{RESOURCE_FAILED, RESOURCE_PENDING};
use serde_json::Value;

pub use http::HttpInvoker;
pub use simulated::{Scenario, SimulatedInvoker};

/// Cliente de funciones remotas. Una llamada a `invoke` es exactamente una
/// invocación remota.
#[async_trait]
pub trait StepInvoker: Send + Sync + std::fmt::Debug {
    async fn invoke(&self, function: &str, payload: Value) -> Result<Value, StepError>;
}

/// Clasifica un error remoto por su nombre.
///
/// `ResourcePendingException` es transitorio, `ResourceFailedException`
/// terminal; cualquier otro nombre queda como no clasificado.
pub fn classify_error(error_type: &str, message: &str) -> StepError {
    match error_type {
        RESOURCE_PENDING => StepError::transient(error_type, message),
        RESOURCE_FAILED => StepError::terminal(error_type, message),
        other => StepError::unclassified(format!("{other}: {message}")),
    }
}
