//! Errores del core: errores del motor y errores clasificados de steps.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Nombre del error que emite el executor cuando un step excede su timeout.
pub const TIMEOUT_ERROR: &str = "States.Timeout";
/// Nombre reportado por errores sin clasificación explícita.
pub const UNCLASSIFIED_ERROR: &str = "States.Unclassified";
/// Matcher comodín (catch-all).
pub const ALL_ERRORS: &str = "States.ALL";

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("execution already terminal")] ExecutionTerminal,
    #[error("unknown state '{0}'")] UnknownState(String),
    #[error("invalid graph: {0}")] InvalidGraph(String),
    #[error("internal: {0}")] Internal(String),
}

/// Error devuelto por un step remoto, ya clasificado.
///
/// - `Transient`: el trabajo remoto sigue en curso; el caller reintenta según
///   su `RetryRule`.
/// - `Terminal`: fallo definitivo; el caller evalúa las `CatchRule`.
/// - `Unclassified`: cualquier otra cosa (incluye timeouts); sólo lo captura el
///   catch-all.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum StepError {
    #[error("transient {kind}: {message}")]
    Transient { kind: String, message: String },
    #[error("terminal {kind}: {message}")]
    Terminal { kind: String, message: String },
    #[error("unclassified ({kind}): {message}")]
    Unclassified { kind: String, message: String },
}

impl StepError {
    pub fn transient(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient { kind: kind.into(),
                          message: message.into() }
    }

    pub fn terminal(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Terminal { kind: kind.into(),
                         message: message.into() }
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified { kind: UNCLASSIFIED_ERROR.to_string(),
                             message: message.into() }
    }

    pub fn timeout(step: &str, after_ms: u128) -> Self {
        Self::Unclassified { kind: TIMEOUT_ERROR.to_string(),
                             message: format!("step '{step}' timed out after {after_ms}ms") }
    }

    /// Nombre de error usado por los matchers de retry/catch.
    pub fn kind(&self) -> &str {
        match self {
            StepError::Transient { kind, .. } | StepError::Terminal { kind, .. } | StepError::Unclassified { kind, .. } => kind,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StepError::Transient { message, .. }
            | StepError::Terminal { message, .. }
            | StepError::Unclassified { message, .. } => message,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StepError::Transient { .. })
    }

    /// Un transitorio que agotó sus reintentos pasa a terminal con el mismo kind.
    pub fn into_terminal(self) -> Self {
        match self {
            StepError::Transient { kind, message } => StepError::Terminal { kind, message },
            other => other,
        }
    }

    /// Objeto que se adjunta bajo el `result_path` de una regla de catch.
    pub fn to_payload(&self) -> Value {
        json!({ "Error": self.kind(), "Cause": self.message() })
    }
}
