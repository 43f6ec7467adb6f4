//! Adaptador de trigger: notificación de objeto creado → una ejecución.

mod event;
mod params;
mod starter;

use std::sync::Arc;

use forecast_core::injection::merge_json;
use log::{debug, error, info};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::input::WorkflowInput;

pub use event::{parse_notification, ObjectCreatedEvent};
pub use params::{FileParameterSource, ParameterSource, StaticParameterSource};
pub use starter::{EngineStarter, ExecutionStarter};

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("malformed notification: {0}")] MalformedEvent(String),
    #[error("cannot load parameters from {source_name}: {reason}")]
    ParameterLoad { source_name: String, reason: String },
    #[error("parameters must be a JSON object")] ParametersNotObject,
    #[error("invalid workflow input: {0}")] InvalidParameters(String),
    #[error("failed to start execution: {0}")] Start(String),
}

/// Filtro de objetos que disparan el pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerFilter {
    pub prefix: String,
    pub suffix: String,
}

impl Default for TriggerFilter {
    fn default() -> Self {
        Self { prefix: "train/".to_string(),
               suffix: ".csv".to_string() }
    }
}

impl TriggerFilter {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(),
               suffix: suffix.into() }
    }

    pub fn qualifies(&self, key: &str) -> bool {
        key.starts_with(&self.prefix) && key.ends_with(&self.suffix)
    }
}

/// Construye el input de la ejecución: parámetros + `{bucket, key}`.
pub fn execution_input(params: &Value, object: &ObjectCreatedEvent) -> Value {
    merge_json(params, &json!({ "bucket": object.bucket, "key": object.key }))
}

#[derive(Debug)]
pub struct TriggerAdapter {
    filter: TriggerFilter,
    params: Arc<dyn ParameterSource>,
    starter: Arc<dyn ExecutionStarter>,
}

impl TriggerAdapter {
    pub fn new(filter: TriggerFilter, params: Arc<dyn ParameterSource>, starter: Arc<dyn ExecutionStarter>) -> Self {
        Self { filter,
               params,
               starter }
    }

    /// Procesa una notificación y devuelve los ids de las ejecuciones
    /// iniciadas (una por objeto que califica).
    ///
    /// Los parámetros se cargan una sola vez y antes de iniciar cualquier
    /// ejecución: si la carga falla, o algún input no es un `WorkflowInput`
    /// válido, no se inicia ninguna. Si falla un arranque, los ids ya
    /// iniciados quedan en el log.
    pub async fn handle(&self, notification: &Value) -> Result<Vec<Uuid>, TriggerError> {
        let objects = parse_notification(notification)?;
        let qualifying: Vec<ObjectCreatedEvent> = objects.into_iter()
                                                         .filter(|o| {
                                                             let ok = self.filter.qualifies(&o.key);
                                                             if !ok {
                                                                 debug!("ignoring s3://{}/{}", o.bucket, o.key);
                                                             }
                                                             ok
                                                         })
                                                         .collect();
        if qualifying.is_empty() {
            return Ok(Vec::new());
        }

        let params = self.params.load().await?;
        if !params.is_object() {
            return Err(TriggerError::ParametersNotObject);
        }

        let inputs = qualifying.iter()
                               .map(|object| -> Result<Value, TriggerError> {
                                   let input = execution_input(&params, object);
                                   WorkflowInput::from_value(&input).map_err(|e| TriggerError::InvalidParameters(e.to_string()))?;
                                   Ok(input)
                               })
                               .collect::<Result<Vec<Value>, TriggerError>>()?;

        let mut started = Vec::with_capacity(inputs.len());
        for (object, input) in qualifying.iter().zip(inputs) {
            match self.starter.start(input).await {
                Ok(id) => {
                    info!("started execution {} for s3://{}/{}", id, object.bucket, object.key);
                    started.push(id);
                }
                Err(e) => {
                    error!("cannot start execution for s3://{}/{}: {} (already started: {:?})",
                           object.bucket,
                           object.key,
                           e,
                           started);
                    return Err(e);
                }
            }
        }
        Ok(started)
    }
}
