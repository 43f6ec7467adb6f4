use thiserror::Error;

use forecast_adapters::{ConfigError, TriggerError};
use forecast_core::CoreEngineError;
use forecast_infra::InfraError;

/// Errores de la aplicación: agrupa los errores de cada crate del workspace.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigError),
    #[error("Error del motor: {0}")]
    Engine(#[from] CoreEngineError),
    #[error("Error de trigger: {0}")]
    Trigger(#[from] TriggerError),
    #[error("Recursos inválidos: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Infra(Vec<InfraError>),
    #[error("Validación fallida: {0}")]
    Validation(String),
}

impl From<Vec<InfraError>> for AppError {
    fn from(problems: Vec<InfraError>) -> Self {
        AppError::Infra(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_variant_format() {
        let err: AppError = ConfigError::Missing("FORECAST_INVOKER_URL").into();
        assert_eq!(err.to_string(), "Error de configuración: FORECAST_INVOKER_URL is not set");
    }

    #[test]
    fn infra_variant_joins_problems() {
        let err: AppError = vec![InfraError::DuplicateId("A".into()), InfraError::EmptyFilter("B".into())].into();
        assert_eq!(err.to_string(),
                   "Recursos inválidos: duplicate logical id 'A'; event source 'B' has an empty prefix or suffix filter");
    }
}
