use std::sync::Arc;

use async_trait::async_trait;
use forecast_core::{EventStore, ExecutionHandle, FlowEngine, FlowRepository};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::TriggerError;

/// Arranca una ejecución del workflow con el input dado.
#[async_trait]
pub trait ExecutionStarter: Send + Sync + std::fmt::Debug {
    async fn start(&self, input: Value) -> Result<Uuid, TriggerError>;
}

/// Starter que lanza ejecuciones en un `FlowEngine` y guarda sus handles.
#[derive(Debug)]
pub struct EngineStarter<E, R>
    where E: EventStore,
          R: FlowRepository
{
    engine: Arc<FlowEngine<E, R>>,
    handles: Mutex<Vec<ExecutionHandle>>,
}

impl<E, R> EngineStarter<E, R>
    where E: EventStore + std::fmt::Debug + 'static,
          R: FlowRepository + std::fmt::Debug + 'static
{
    pub fn new(engine: Arc<FlowEngine<E, R>>) -> Self {
        Self { engine,
               handles: Mutex::new(Vec::new()) }
    }

    pub fn engine(&self) -> &Arc<FlowEngine<E, R>> {
        &self.engine
    }

    /// Entrega los handles de las ejecuciones lanzadas hasta ahora.
    pub async fn take_handles(&self) -> Vec<ExecutionHandle> {
        std::mem::take(&mut *self.handles.lock().await)
    }
}

#[async_trait]
impl<E, R> ExecutionStarter for EngineStarter<E, R>
    where E: EventStore + std::fmt::Debug + 'static,
          R: FlowRepository + std::fmt::Debug + 'static
{
    async fn start(&self, input: Value) -> Result<Uuid, TriggerError> {
        let handle = self.engine.spawn(input);
        let id = handle.id;
        self.handles.lock().await.push(handle);
        Ok(id)
    }
}
