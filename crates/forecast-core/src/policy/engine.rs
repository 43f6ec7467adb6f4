//! Ejecución de un estado Task envuelta en retry acotado + catch first-match.

use log::{debug, info, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::engine::AbortHandle;
use crate::errors::StepError;
use crate::event::{EventStore, FlowEventKind};
use crate::graph::TaskState;
use crate::hashing::hash_value;
use crate::step::{StepExecutor, StepInvocation};

/// Resultado de correr un Task bajo sus políticas.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Succeeded(Value),
    /// Una regla de catch capturó el error; la ejecución sigue en `next`.
    Caught {
        rule_index: usize,
        next: String,
        payload: Value,
        error: StepError,
    },
    /// Ninguna regla capturó el error: fatal para la ejecución.
    Unhandled(StepError),
    /// Abort externo durante una espera de backoff.
    Aborted,
}

pub struct RetryCatchEngine<'a, E: EventStore + ?Sized> {
    store: &'a E,
    execution_id: Uuid,
    abort: &'a AbortHandle,
    executor: StepExecutor,
}

impl<'a, E: EventStore + ?Sized> RetryCatchEngine<'a, E> {
    pub fn new(store: &'a E, execution_id: Uuid, abort: &'a AbortHandle) -> Self {
        Self { store,
               execution_id,
               abort,
               executor: StepExecutor }
    }

    /// Corre `task` (estado `state`) con `payload` hasta éxito, catch,
    /// error no manejado o abort.
    ///
    /// Cada `RetryRule` lleva su propio contador; el primer rule (en orden de
    /// declaración) que aplica al error transitorio es el que consume intento.
    pub async fn run(&self, state: &str, task: &TaskState, payload: Value) -> TaskOutcome {
        let mut counters = vec![0u32; task.retry.len()];
        let mut invocation = StepInvocation::first(state, payload);

        loop {
            self.store.append_kind(self.execution_id,
                                   FlowEventKind::StepStarted { state: state.to_string(),
                                                                step_id: task.step.id().to_string(),
                                                                attempt: invocation.attempt });

            let err = match self.executor.invoke(task.step.as_ref(), &invocation, task.timeout).await {
                Ok(output) => {
                    self.store.append_kind(self.execution_id,
                                           FlowEventKind::StepSucceeded { state: state.to_string(),
                                                                          attempt: invocation.attempt,
                                                                          output_hash: hash_value(&output) });
                    return TaskOutcome::Succeeded(output);
                }
                Err(e) => e,
            };

            let error = match task.retry.iter().position(|r| r.applies_to(&err)) {
                Some(idx) if counters[idx] < task.retry[idx].max_attempts => {
                    counters[idx] += 1;
                    let delay = task.retry[idx].delay_for(counters[idx]);
                    warn!("state '{}' attempt {} failed with {}: retry {}/{} in {:?}",
                          state,
                          invocation.attempt,
                          err.kind(),
                          counters[idx],
                          task.retry[idx].max_attempts,
                          delay);
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    self.store.append_kind(self.execution_id,
                                           FlowEventKind::RetryScheduled { state: state.to_string(),
                                                                           attempt: invocation.attempt,
                                                                           retry: counters[idx],
                                                                           delay_ms,
                                                                           error: err.clone() });
                    if !self.abort.sleep(delay).await {
                        return TaskOutcome::Aborted;
                    }
                    invocation = invocation.retry_after(err);
                    continue;
                }
                Some(idx) => {
                    debug!("state '{}' exhausted retry rule {} after {} retries",
                           state,
                           idx,
                           counters[idx]);
                    err.into_terminal()
                }
                None => err.into_terminal(),
            };

            self.store.append_kind(self.execution_id,
                                   FlowEventKind::StepFailed { state: state.to_string(),
                                                               attempt: invocation.attempt,
                                                               error: error.clone() });

            return match task.catch.iter().position(|c| c.matches(&error)) {
                Some(rule_index) => {
                    let rule = &task.catch[rule_index];
                    info!("state '{}' error {} caught by rule {} -> '{}'",
                          state,
                          error.kind(),
                          rule_index,
                          rule.next);
                    self.store.append_kind(self.execution_id,
                                           FlowEventKind::CatchMatched { state: state.to_string(),
                                                                         rule_index,
                                                                         next: rule.next.clone(),
                                                                         result_path: rule.result_path.clone() });
                    TaskOutcome::Caught { rule_index,
                                          next: rule.next.clone(),
                                          payload: rule.recovery_payload(&invocation.payload, &error),
                                          error }
                }
                None => TaskOutcome::Unhandled(error),
            };
        }
    }
}
