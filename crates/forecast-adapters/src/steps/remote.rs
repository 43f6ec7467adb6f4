use std::sync::Arc;

use async_trait::async_trait;
use forecast_core::{StepDefinition, StepError, StepKind};
use serde_json::Value;

use crate::invoker::StepInvoker;

/// Step que delega en una función remota con nombre.
#[derive(Debug, Clone)]
pub struct RemoteStep {
    function: String,
    kind: StepKind,
    invoker: Arc<dyn StepInvoker>,
}

impl RemoteStep {
    pub fn new(function: impl Into<String>, kind: StepKind, invoker: Arc<dyn StepInvoker>) -> Self {
        Self { function: function.into(),
               kind,
               invoker }
    }
}

#[async_trait]
impl StepDefinition for RemoteStep {
    fn id(&self) -> &str {
        &self.function
    }

    fn kind(&self) -> StepKind {
        self.kind
    }

    async fn invoke(&self, payload: Value) -> Result<Value, StepError> {
        self.invoker.invoke(&self.function, payload).await
    }
}
