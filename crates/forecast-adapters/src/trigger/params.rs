use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::TriggerError;

/// Fuente del objeto de parámetros del pipeline.
#[async_trait]
pub trait ParameterSource: Send + Sync + std::fmt::Debug {
    async fn load(&self) -> Result<Value, TriggerError>;
}

#[derive(Debug, Clone)]
pub struct FileParameterSource {
    path: PathBuf,
}

impl FileParameterSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ParameterSource for FileParameterSource {
    async fn load(&self) -> Result<Value, TriggerError> {
        let source_name = self.path.display().to_string();
        let raw = tokio::fs::read_to_string(&self.path).await
                                                       .map_err(|e| TriggerError::ParameterLoad { source_name: source_name.clone(),
                                                                                                  reason: e.to_string() })?;
        serde_json::from_str(&raw).map_err(|e| TriggerError::ParameterLoad { source_name,
                                                                             reason: e.to_string() })
    }
}

#[derive(Debug, Clone)]
pub struct StaticParameterSource(pub Value);

#[async_trait]
impl ParameterSource for StaticParameterSource {
    async fn load(&self) -> Result<Value, TriggerError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"PerformDelete": false, "DatasetName": "sales"}}"#).unwrap();
        let v = FileParameterSource::new(file.path()).load().await.unwrap();
        assert_eq!(v, json!({"PerformDelete": false, "DatasetName": "sales"}));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileParameterSource::new(dir.path().join("params.json")).load().await.unwrap_err();
        assert!(matches!(err, TriggerError::ParameterLoad { .. }));
    }

    #[tokio::test]
    async fn invalid_json_is_a_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(FileParameterSource::new(file.path()).load().await.is_err());
    }
}
