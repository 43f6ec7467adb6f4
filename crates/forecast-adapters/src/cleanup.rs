//! Supervisor de limpieza para ejecuciones abortadas o fallidas.
//!
//! Corre fuera de la máquina de estados: emite borrados best-effort en el
//! orden de la cadena de borrado, sin reintentos, registrando y descartando
//! los errores.

use std::sync::Arc;

use forecast_core::{CoreEngineError, ExecutionHandle, ExecutionState, ExecutionStatus, StepError};
use log::{info, warn};
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::invoker::StepInvoker;
use crate::pipeline::DELETION_CHAIN;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanupReport {
    pub attempted: Vec<String>,
    pub failed: Vec<(String, StepError)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CleanupSupervisor {
    invoker: Arc<dyn StepInvoker>,
    functions: Vec<String>,
}

impl CleanupSupervisor {
    pub fn new(invoker: Arc<dyn StepInvoker>, cfg: &PipelineConfig) -> Self {
        Self { invoker,
               functions: DELETION_CHAIN.iter().map(|s| cfg.function_name(s)).collect() }
    }

    /// Una invocación por función de borrado con `payload`.
    pub async fn cleanup(&self, payload: &Value) -> CleanupReport {
        let mut report = CleanupReport::default();
        for function in &self.functions {
            report.attempted.push(function.clone());
            match self.invoker.invoke(function, payload.clone()).await {
                Ok(_) => info!("cleanup {} issued", function),
                Err(e) => {
                    warn!("cleanup {} failed: {}", function, e);
                    report.failed.push((function.clone(), e));
                }
            }
        }
        report
    }

    /// Decide si una ejecución terminada necesita limpieza.
    pub fn needs_cleanup(state: &ExecutionState) -> bool {
        matches!(state.status(), ExecutionStatus::Aborted | ExecutionStatus::Failed)
    }

    /// Espera la ejecución y, si terminó abortada o fallida, limpia usando su
    /// último payload.
    pub async fn supervise(&self,
                           handle: ExecutionHandle)
                           -> Result<(ExecutionState, Option<CleanupReport>), CoreEngineError> {
        let state = handle.wait().await?;
        if !Self::needs_cleanup(&state) {
            return Ok((state, None));
        }
        info!("execution {} ended {:?}; issuing cleanup", state.id(), state.status());
        let report = self.cleanup(state.payload()).await;
        Ok((state, Some(report)))
    }
}
