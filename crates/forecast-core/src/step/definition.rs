use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Crea o espera un recurso remoto.
    Provision,
    /// Publica resultados (actualización de tablas de consulta).
    Publish,
    /// Envía una notificación.
    Notify,
    /// Elimina recursos creados por el pipeline.
    Cleanup,
}

/// Trait que define un Step remoto.
///
/// El engine nunca reintenta dentro de `invoke`: cada llamada es exactamente
/// una invocación remota.
#[async_trait]
pub trait StepDefinition: Send + Sync + std::fmt::Debug {
    /// Identificador estable (nombre de la función remota o similar).
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    /// Tipo general del step.
    fn kind(&self) -> StepKind;

    async fn invoke(&self, payload: Value) -> Result<Value, StepError>;
}
