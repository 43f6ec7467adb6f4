use std::time::Duration;

use async_trait::async_trait;
use forecast_core::StepError;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use super::{classify_error, StepInvoker};

/// Invoker HTTP: `POST {base_url}/{function}` con el payload JSON.
///
/// Una respuesta con `errorType` (con cualquier status) se clasifica con
/// `classify_error`; los errores de transporte quedan no clasificados.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: Client,
    base_url: String,
}

impl HttpInvoker {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StepError> {
        Self::with_timeout(base_url, Duration::from_secs(900))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StepError> {
        let client = Client::builder().timeout(timeout)
                                      .build()
                                      .map_err(|e| StepError::unclassified(format!("http client: {e}")))?;
        Ok(Self { client,
                  base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn endpoint(&self, function: &str) -> String {
        format!("{}/{}", self.base_url, function)
    }
}

#[async_trait]
impl StepInvoker for HttpInvoker {
    async fn invoke(&self, function: &str, payload: Value) -> Result<Value, StepError> {
        let url = self.endpoint(function);
        debug!("POST {}", url);
        let response = self.client
                           .post(&url)
                           .json(&payload)
                           .send()
                           .await
                           .map_err(|e| StepError::unclassified(format!("{function}: {e}")))?;
        let status = response.status();
        let body: Value = response.json()
                                  .await
                                  .map_err(|e| StepError::unclassified(format!("{function}: invalid response body: {e}")))?;
        response_to_result(function, status.is_success(), body)
    }
}

fn response_to_result(function: &str, success: bool, body: Value) -> Result<Value, StepError> {
    if let Some(kind) = body.get("errorType").and_then(Value::as_str) {
        let message = body.get("errorMessage").and_then(Value::as_str).unwrap_or_default();
        return Err(classify_error(kind, message));
    }
    if success {
        Ok(body)
    } else {
        Err(StepError::unclassified(format!("{function}: unexpected error response {body}")))
    }
}
