//! Core FlowEngine implementation

use std::sync::Arc;

use log::{debug, error, info};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::AbortHandle;
use crate::constants::{ENGINE_VERSION, MAX_TRANSITIONS};
use crate::errors::{CoreEngineError, StepError};
use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
use crate::graph::{Edge, StateNode, WorkflowGraph};
use crate::hashing::hash_value;
use crate::model::{ExecutionState, ExecutionStatus};
use crate::policy::{RetryCatchEngine, TaskOutcome};
use crate::repo::{ExecutionSummary, FlowRepository, InMemoryFlowRepository};

/// Motor de ejecución del workflow.
///
/// Orquesta los estados del grafo en orden, delega cada Task al
/// `RetryCatchEngine` y deja registro append-only en el `EventStore`.
#[derive(Debug)]
pub struct FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    graph: Arc<WorkflowGraph>,
    event_store: Arc<E>,
    repository: Arc<R>,
}

/// Ejecución lanzada en una tarea tokio.
#[derive(Debug)]
pub struct ExecutionHandle {
    pub id: Uuid,
    pub abort: AbortHandle,
    join: JoinHandle<Result<ExecutionState, CoreEngineError>>,
}

impl ExecutionHandle {
    /// Espera el estado terminal de la ejecución.
    pub async fn wait(self) -> Result<ExecutionState, CoreEngineError> {
        self.join
            .await
            .map_err(|e| CoreEngineError::Internal(format!("execution task failed: {e}")))?
    }
}

impl FlowEngine<InMemoryEventStore, InMemoryFlowRepository> {
    /// Crea un engine con stores en memoria.
    pub fn new(graph: WorkflowGraph) -> Self {
        Self::new_with_stores(graph, InMemoryEventStore::default(), InMemoryFlowRepository::new())
    }
}

impl<E, R> FlowEngine<E, R>
    where E: EventStore + 'static,
          R: FlowRepository + 'static
{
    pub fn new_with_stores(graph: WorkflowGraph, event_store: E, repository: R) -> Self {
        Self { graph: Arc::new(graph),
               event_store: Arc::new(event_store),
               repository: Arc::new(repository) }
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Ejecuta una nueva ejecución hasta un estado terminal.
    pub async fn execute(&self, input: Value) -> Result<ExecutionState, CoreEngineError> {
        self.execute_with(Uuid::new_v4(), input, &AbortHandle::new()).await
    }

    /// Lanza la ejecución en una tarea independiente.
    pub fn spawn(self: &Arc<Self>, input: Value) -> ExecutionHandle {
        let id = Uuid::new_v4();
        let abort = AbortHandle::new();
        let engine = Arc::clone(self);
        let task_abort = abort.clone();
        let join = tokio::spawn(async move { engine.execute_with(id, input, &task_abort).await });
        ExecutionHandle { id, abort, join }
    }

    /// Corre la ejecución `execution_id`. Los errores de step nunca salen
    /// como `Err`: terminan en `Failed` dentro del `ExecutionState`. `Err`
    /// queda para fallas del motor (estado desconocido, ciclo sin fin).
    pub async fn execute_with(&self,
                              execution_id: Uuid,
                              input: Value,
                              abort: &AbortHandle)
                              -> Result<ExecutionState, CoreEngineError> {
        if self.repository.archived(execution_id).is_some() {
            return Err(CoreEngineError::ExecutionTerminal);
        }
        let mut state = ExecutionState::start(execution_id, input, self.graph.start());
        self.event_store.append_kind(execution_id,
                                     FlowEventKind::ExecutionStarted { definition_hash:
                                                                           self.graph.definition_hash().to_string(),
                                                                       start_state: self.graph.start().to_string(),
                                                                       input_hash: hash_value(state.input()) });
        info!("execution {} started at '{}'", execution_id, self.graph.start());

        let tasks = RetryCatchEngine::new(self.event_store.as_ref(), execution_id, abort);

        for _ in 0..MAX_TRANSITIONS {
            let current = state.current()
                               .ok_or_else(|| CoreEngineError::Internal("execution without current state".into()))?
                               .to_string();
            if abort.is_aborted() {
                return Ok(self.finish_aborted(state, &current));
            }
            let node = self.graph
                           .state(&current)
                           .ok_or_else(|| CoreEngineError::UnknownState(current.clone()))?;

            match node {
                StateNode::Task(task) => match tasks.run(&current, task, state.payload().clone()).await {
                    TaskOutcome::Succeeded(output) => {
                        let payload = task.result_path.apply(state.payload(), output.clone());
                        state.record(&current, output);
                        match &task.next {
                            Edge::Next(next) => {
                                info!("execution {}: '{}' -> '{}'", execution_id, current, next);
                                state.advance(next, payload);
                            }
                            Edge::End => {
                                state.set_payload(payload);
                                return Ok(self.finish_succeeded(state, &current));
                            }
                        }
                    }
                    TaskOutcome::Caught { next, payload, .. } => {
                        state.record(&current, payload.clone());
                        state.advance(&next, payload);
                    }
                    TaskOutcome::Unhandled(err) => return Ok(self.finish_failed(state, &current, err)),
                    TaskOutcome::Aborted => return Ok(self.finish_aborted(state, &current)),
                },
                StateNode::Choice(choice) => {
                    let value = choice.predicate.evaluate(state.input());
                    let next = choice.target(value).to_string();
                    self.event_store.append_kind(execution_id,
                                                 FlowEventKind::ChoiceEvaluated { state: current.clone(),
                                                                                  value,
                                                                                  next: next.clone() });
                    info!("execution {}: choice '{}' = {} -> '{}'", execution_id, current, value, next);
                    state.record(&current, json!({ "result": value, "next": next }));
                    let payload = state.payload().clone();
                    state.advance(&next, payload);
                }
                StateNode::Succeed => {
                    let payload = state.payload().clone();
                    state.record(&current, payload);
                    return Ok(self.finish_succeeded(state, &current));
                }
            }
        }
        Err(CoreEngineError::Internal(format!("execution {execution_id} exceeded {MAX_TRANSITIONS} transitions")))
    }

    fn finish_succeeded(&self, mut state: ExecutionState, at: &str) -> ExecutionState {
        let output_hashes: Vec<String> = state.history().iter().map(|h| hash_value(&h.output)).collect();
        let fingerprint = hash_value(&json!({
                                         "engine_version": ENGINE_VERSION,
                                         "definition_hash": self.graph.definition_hash(),
                                         "output_hashes": output_hashes,
                                     }));
        self.event_store.append_kind(state.id(),
                                     FlowEventKind::ExecutionSucceeded { state: at.to_string(),
                                                                         fingerprint: fingerprint.clone() });
        info!("execution {} succeeded at '{}'", state.id(), at);
        state.finish(ExecutionStatus::Succeeded, None, Some(fingerprint));
        self.repository.archive(state.clone());
        state
    }

    fn finish_failed(&self, mut state: ExecutionState, at: &str, err: StepError) -> ExecutionState {
        error!("execution {} failed at '{}': {}", state.id(), at, err);
        self.event_store.append_kind(state.id(),
                                     FlowEventKind::ExecutionFailed { state: at.to_string(),
                                                                      error: err.clone() });
        state.finish(ExecutionStatus::Failed, Some(err), None);
        self.repository.archive(state.clone());
        state
    }

    fn finish_aborted(&self, mut state: ExecutionState, at: &str) -> ExecutionState {
        info!("execution {} aborted at '{}'", state.id(), at);
        self.event_store.append_kind(state.id(), FlowEventKind::ExecutionAborted { state: at.to_string() });
        state.finish(ExecutionStatus::Aborted, None, None);
        self.repository.archive(state.clone());
        state
    }

    pub fn events_for(&self, execution_id: Uuid) -> Vec<FlowEvent> {
        self.event_store.list(execution_id)
    }

    /// Variante compacta de eventos de una ejecución.
    pub fn event_variants(&self, execution_id: Uuid) -> Vec<&'static str> {
        self.events_for(execution_id).iter().map(|e| e.kind.variant()).collect()
    }

    /// Replay de eventos a través del repositorio.
    pub fn replay(&self, execution_id: Uuid) -> ExecutionSummary {
        let events = self.events_for(execution_id);
        self.repository.load(execution_id, &events)
    }

    pub fn archived(&self, execution_id: Uuid) -> Option<ExecutionState> {
        self.repository.archived(execution_id)
    }

    /// Libera eventos y archivo de una ejecución terminada.
    ///
    /// Devuelve el estado archivado; `None` si la ejecución no está archivada
    /// (sigue en curso o no existe), en cuyo caso no se toca nada.
    pub fn evict(&self, execution_id: Uuid) -> Option<ExecutionState> {
        let state = self.repository.remove(execution_id)?;
        let dropped = self.event_store.remove(execution_id);
        debug!("evicted execution {} ({} events)", execution_id, dropped);
        Some(state)
    }
}
