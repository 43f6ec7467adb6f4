//! Tipos de evento de una ejecución y estructura `FlowEvent`.
//!
//! Rol en el flujo:
//! - Cada ejecución del `FlowEngine` emite eventos a un `EventStore`
//!   append-only.
//! - Estos eventos permiten reconstruir el estado resumido de la ejecución
//!   (replay) en el `FlowRepository`.
//! - El enum `FlowEventKind` es el contrato observable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StepError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de toda ejecución.
    ExecutionStarted {
        definition_hash: String,
        start_state: String,
        input_hash: String,
    },
    /// Un intento de invocación comenzó. No implica éxito.
    StepStarted { state: String, step_id: String, attempt: u32 },
    StepSucceeded { state: String, attempt: u32, output_hash: String },
    /// Error transitorio con presupuesto de reintento: se espera `delay_ms`.
    RetryScheduled {
        state: String,
        attempt: u32,
        retry: u32,
        delay_ms: u64,
        error: StepError,
    },
    /// Error terminal (o transitorio agotado) antes de evaluar catch.
    StepFailed { state: String, attempt: u32, error: StepError },
    CatchMatched {
        state: String,
        rule_index: usize,
        next: String,
        result_path: Option<String>,
    },
    ChoiceEvaluated { state: String, value: bool, next: String },
    ExecutionSucceeded { state: String, fingerprint: String },
    ExecutionFailed { state: String, error: StepError },
    ExecutionAborted { state: String },
}

impl FlowEventKind {
    /// Letra compacta usada en tests y en la salida del CLI.
    pub fn variant(&self) -> &'static str {
        match self {
            FlowEventKind::ExecutionStarted { .. } => "I",
            FlowEventKind::StepStarted { .. } => "S",
            FlowEventKind::StepSucceeded { .. } => "F",
            FlowEventKind::RetryScheduled { .. } => "R",
            FlowEventKind::StepFailed { .. } => "X",
            FlowEventKind::CatchMatched { .. } => "K",
            FlowEventKind::ChoiceEvaluated { .. } => "B",
            FlowEventKind::ExecutionSucceeded { .. } => "C",
            FlowEventKind::ExecutionFailed { .. } => "E",
            FlowEventKind::ExecutionAborted { .. } => "A",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub execution_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>, // metadato, no entra en fingerprint
}
