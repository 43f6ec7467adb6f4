use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::StepError;

/// Estado de una ejecución.
///
/// Transiciones válidas: `Running` -> `Succeeded` | `Failed` | `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    /// Error sin catch (p. ej. dentro de la cadena de borrado).
    Failed,
    /// Abort externo entre estados o durante una espera de backoff.
    Aborted,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

/// Un estado visitado y el payload que produjo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state: String,
    pub output: Value,
}

/// Estado de una ejecución. Sólo el executor lo muta; una vez terminal se
/// archiva en el `FlowRepository`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    id: Uuid,
    input: Value,
    current: Option<String>,
    payload: Value,
    history: Vec<HistoryEntry>,
    status: ExecutionStatus,
    error: Option<StepError>,
    fingerprint: Option<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ExecutionState {
    pub(crate) fn start(id: Uuid, input: Value, start_state: &str) -> Self {
        Self { id,
               payload: input.clone(),
               input,
               current: Some(start_state.to_string()),
               history: Vec::new(),
               status: ExecutionStatus::Running,
               error: None,
               fingerprint: None,
               started_at: Utc::now(),
               finished_at: None }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Input original de la ejecución (inmutable).
    pub fn input(&self) -> &Value {
        &self.input
    }

    /// Estado actual; en estados terminales, el último estado ejecutado.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Payload que fluye hacia el siguiente estado.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Nombres de estados visitados, en orden.
    pub fn visited(&self) -> Vec<&str> {
        self.history.iter().map(|h| h.state.as_str()).collect()
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn error(&self) -> Option<&StepError> {
        self.error.as_ref()
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub(crate) fn record(&mut self, state: &str, output: Value) {
        self.history.push(HistoryEntry { state: state.to_string(),
                                         output });
    }

    pub(crate) fn advance(&mut self, next: &str, payload: Value) {
        self.current = Some(next.to_string());
        self.payload = payload;
    }

    pub(crate) fn set_payload(&mut self, payload: Value) {
        self.payload = payload;
    }

    pub(crate) fn finish(&mut self, status: ExecutionStatus, error: Option<StepError>, fingerprint: Option<String>) {
        self.status = status;
        self.error = error;
        self.fingerprint = fingerprint;
        self.finished_at = Some(Utc::now());
    }
}
