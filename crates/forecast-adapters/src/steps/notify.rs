use async_trait::async_trait;
use forecast_core::injection::merge_json;
use forecast_core::{StepDefinition, StepError, StepKind};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Mensaje publicado en el tópico de notificaciones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub topic: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait Publisher: Send + Sync + std::fmt::Debug {
    async fn publish(&self, notification: Notification) -> Result<(), StepError>;
}

/// Publica sólo en el log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, notification: Notification) -> Result<(), StepError> {
        info!("[{}] {}: {}", notification.topic, notification.subject, notification.message);
        Ok(())
    }
}

/// Tópico con colas suscritas: cada publicación se copia a cada cola.
///
/// Publicar nunca espera al consumidor: una cola llena o cerrada es un error
/// no clasificado del step.
#[derive(Debug, Default)]
pub struct QueuePublisher {
    subscribers: Vec<mpsc::Sender<Notification>>,
}

impl QueuePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suscribe una cola nueva con capacidad `capacity`.
    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subscribers.push(tx);
        rx
    }
}

#[async_trait]
impl Publisher for QueuePublisher {
    async fn publish(&self, notification: Notification) -> Result<(), StepError> {
        if self.subscribers.is_empty() {
            return Err(StepError::unclassified(format!("topic '{}' has no subscriptions", notification.topic)));
        }
        for tx in &self.subscribers {
            tx.try_send(notification.clone()).map_err(|e| match e {
                                                 TrySendError::Full(_) => {
                                                     StepError::unclassified(format!("queue subscribed to '{}' is full",
                                                                                     notification.topic))
                                                 }
                                                 TrySendError::Closed(_) => {
                                                     StepError::unclassified(format!("queue subscribed to '{}' is closed",
                                                                                     notification.topic))
                                                 }
                                             })?;
        }
        Ok(())
    }
}

/// Step de notificación.
///
/// Si el payload trae un error bajo `error_field` se notifica una falla con
/// su `Error`/`Cause`; si no, un éxito. El payload sigue intacto, con el id
/// del mensaje en `NotificationId`.
#[derive(Debug, Clone)]
pub struct NotifyStep {
    id: String,
    topic: String,
    error_field: String,
    publisher: Arc<dyn Publisher>,
}

impl NotifyStep {
    pub fn new(id: impl Into<String>,
               topic: impl Into<String>,
               error_field: impl Into<String>,
               publisher: Arc<dyn Publisher>)
               -> Self {
        Self { id: id.into(),
               topic: topic.into(),
               error_field: error_field.into(),
               publisher }
    }

    fn compose(&self, payload: &Value) -> (String, String) {
        let dataset = payload.get("DatasetName").and_then(Value::as_str).unwrap_or("unknown dataset");
        match payload.get(&self.error_field) {
            Some(err) => {
                let kind = err.get("Error").and_then(Value::as_str).unwrap_or("unknown");
                let cause = err.get("Cause").and_then(Value::as_str).unwrap_or_default();
                (format!("Forecast pipeline failed for {dataset}"), format!("{kind}: {cause}"))
            }
            None => (format!("Forecast pipeline completed for {dataset}"),
                     "forecast published and query tables updated".to_string()),
        }
    }
}

#[async_trait]
impl StepDefinition for NotifyStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StepKind {
        StepKind::Notify
    }

    async fn invoke(&self, payload: Value) -> Result<Value, StepError> {
        let (subject, message) = self.compose(&payload);
        let notification = Notification { id: Uuid::new_v4(),
                                          topic: self.topic.clone(),
                                          subject,
                                          message };
        let id = notification.id;
        self.publisher.publish(notification).await?;
        Ok(merge_json(&payload, &json!({ "NotificationId": id.to_string() })))
    }
}
