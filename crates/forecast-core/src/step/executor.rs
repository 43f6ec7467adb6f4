//! Step Executor: invoca un step una sola vez y clasifica el resultado.

use std::time::Duration;

use log::debug;
use serde_json::Value;

use super::{StepDefinition, StepInvocation};
use crate::errors::StepError;

#[derive(Debug, Default, Clone, Copy)]
pub struct StepExecutor;

impl StepExecutor {
    /// Exactamente una invocación remota. Si `timeout` vence se devuelve un
    /// `Unclassified` con kind `States.Timeout`.
    pub async fn invoke(&self,
                        step: &dyn StepDefinition,
                        invocation: &StepInvocation,
                        timeout: Option<Duration>)
                        -> Result<Value, StepError> {
        debug!("invoking step '{}' (state={}, attempt={})",
               step.id(),
               invocation.state,
               invocation.attempt);
        let call = step.invoke(invocation.payload.clone());
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(res) => res,
                Err(_) => Err(StepError::timeout(step.id(), limit.as_millis())),
            },
            None => call.await,
        }
    }
}
