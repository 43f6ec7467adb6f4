//! Repositorio de ejecuciones: replay de eventos y archivo de estados
//! terminales.
//!
//! El replay es lineal: consume los eventos en orden y actualiza un
//! `ExecutionSummary`. No guarda payloads (sólo hashes en los eventos).
use dashmap::DashMap;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::event::{FlowEvent, FlowEventKind};
use crate::model::{ExecutionState, ExecutionStatus};

/// Resumen reconstruido a partir de eventos.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    pub id: Uuid,
    pub status: ExecutionStatus,
    /// Último estado en el que entró la ejecución.
    pub current: Option<String>,
    pub visited: Vec<String>,
    /// Invocaciones por estado (incluye reintentos).
    pub attempts: IndexMap<String, u32>,
    pub retries: u32,
}

pub trait FlowRepository: Send + Sync {
    fn load(&self, execution_id: Uuid, events: &[FlowEvent]) -> ExecutionSummary;
    /// Guarda un estado terminal.
    fn archive(&self, state: ExecutionState);
    fn archived(&self, execution_id: Uuid) -> Option<ExecutionState>;
    /// Saca un estado del archivo.
    fn remove(&self, execution_id: Uuid) -> Option<ExecutionState>;
}

/// Archivo en memoria; no expira nada por sí solo.
#[derive(Debug, Default)]
pub struct InMemoryFlowRepository {
    archive: DashMap<Uuid, ExecutionState>,
}

impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowRepository for InMemoryFlowRepository {
    fn load(&self, execution_id: Uuid, events: &[FlowEvent]) -> ExecutionSummary {
        let mut s = ExecutionSummary { id: execution_id,
                                       status: ExecutionStatus::Running,
                                       current: None,
                                       visited: Vec::new(),
                                       attempts: IndexMap::new(),
                                       retries: 0 };
        for ev in events {
            match &ev.kind {
                FlowEventKind::ExecutionStarted { start_state, .. } => {
                    s.current = Some(start_state.clone());
                }
                FlowEventKind::StepStarted { state, .. } => {
                    s.current = Some(state.clone());
                    *s.attempts.entry(state.clone()).or_insert(0) += 1;
                }
                FlowEventKind::StepSucceeded { state, .. } => s.visited.push(state.clone()),
                FlowEventKind::RetryScheduled { .. } => s.retries += 1,
                FlowEventKind::StepFailed { .. } => {}
                FlowEventKind::CatchMatched { state, .. } => s.visited.push(state.clone()),
                FlowEventKind::ChoiceEvaluated { state, .. } => {
                    s.current = Some(state.clone());
                    s.visited.push(state.clone());
                }
                FlowEventKind::ExecutionSucceeded { state, .. } => {
                    if s.visited.last() != Some(state) {
                        s.visited.push(state.clone());
                    }
                    s.current = Some(state.clone());
                    s.status = ExecutionStatus::Succeeded;
                }
                FlowEventKind::ExecutionFailed { state, .. } => {
                    s.current = Some(state.clone());
                    s.status = ExecutionStatus::Failed;
                }
                FlowEventKind::ExecutionAborted { state } => {
                    s.current = Some(state.clone());
                    s.status = ExecutionStatus::Aborted;
                }
            }
        }
        s
    }

    fn archive(&self, state: ExecutionState) {
        self.archive.insert(state.id(), state);
    }

    fn archived(&self, execution_id: Uuid) -> Option<ExecutionState> {
        self.archive.get(&execution_id).map(|s| s.value().clone())
    }

    fn remove(&self, execution_id: Uuid) -> Option<ExecutionState> {
        self.archive.remove(&execution_id).map(|(_, state)| state)
    }
}
