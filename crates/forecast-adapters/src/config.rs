//! Configuración del pipeline desde variables de entorno (.env soportado).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use thiserror::Error;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

pub const ENV_INVOKER_URL: &str = "FORECAST_INVOKER_URL";
pub const ENV_PARAMS_PATH: &str = "FORECAST_PARAMS_PATH";
pub const ENV_TOPIC: &str = "FORECAST_TOPIC";
pub const ENV_TRIGGER_PREFIX: &str = "FORECAST_TRIGGER_PREFIX";
pub const ENV_TRIGGER_SUFFIX: &str = "FORECAST_TRIGGER_SUFFIX";
pub const ENV_UPDATE_TIMEOUT_SECS: &str = "FORECAST_UPDATE_TIMEOUT_SECS";
pub const ENV_FUNCTION_PREFIX: &str = "FORECAST_FUNCTION_PREFIX";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")] Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")] Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// URL base del endpoint de invocación de funciones remotas.
    pub invoker_url: Option<String>,
    /// Objeto de parámetros que el trigger mezcla con `{bucket, key}`.
    pub parameter_path: PathBuf,
    pub topic_name: String,
    pub trigger_prefix: String,
    pub trigger_suffix: String,
    /// Timeout de invocación de `UpdateResources`.
    pub update_timeout: Duration,
    /// Prefijo agregado a cada nombre de función remota.
    pub function_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { invoker_url: None,
               parameter_path: PathBuf::from("params.json"),
               topic_name: "ForecastMlopsTopic".to_string(),
               trigger_prefix: "train/".to_string(),
               trigger_suffix: ".csv".to_string(),
               update_timeout: Duration::from_secs(30),
               function_prefix: String::new() }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let mut cfg = Self::default();
        cfg.invoker_url = lookup(ENV_INVOKER_URL).filter(|v| !v.is_empty());
        if let Some(p) = lookup(ENV_PARAMS_PATH) {
            cfg.parameter_path = PathBuf::from(p);
        }
        if let Some(t) = lookup(ENV_TOPIC) {
            cfg.topic_name = t;
        }
        if let Some(p) = lookup(ENV_TRIGGER_PREFIX) {
            cfg.trigger_prefix = p;
        }
        if let Some(s) = lookup(ENV_TRIGGER_SUFFIX) {
            cfg.trigger_suffix = s;
        }
        if let Some(v) = lookup(ENV_UPDATE_TIMEOUT_SECS) {
            let secs = v.parse::<u64>()
                        .ok()
                        .filter(|s| *s > 0)
                        .ok_or(ConfigError::Invalid { name: ENV_UPDATE_TIMEOUT_SECS,
                                                      value: v.clone() })?;
            cfg.update_timeout = Duration::from_secs(secs);
        }
        if let Some(p) = lookup(ENV_FUNCTION_PREFIX) {
            cfg.function_prefix = p;
        }
        Ok(cfg)
    }

    /// URL del invoker; requerida sólo para ejecuciones remotas.
    pub fn require_invoker_url(&self) -> Result<&str, ConfigError> {
        self.invoker_url.as_deref().ok_or(ConfigError::Missing(ENV_INVOKER_URL))
    }

    pub fn function_name(&self, base: &str) -> String {
        format!("{}{}", self.function_prefix, base)
    }
}

/// Forzar carga temprana de .env desde los binarios.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.require_invoker_url(), Err(ConfigError::Missing(ENV_INVOKER_URL)));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = PipelineConfig::from_lookup(lookup(&[(ENV_INVOKER_URL, "http://localhost:9000"),
                                                        (ENV_UPDATE_TIMEOUT_SECS, "45"),
                                                        (ENV_FUNCTION_PREFIX, "prod-")])).unwrap();
        assert_eq!(cfg.require_invoker_url(), Ok("http://localhost:9000"));
        assert_eq!(cfg.update_timeout, Duration::from_secs(45));
        assert_eq!(cfg.function_name("CreateDataset"), "prod-CreateDataset");
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = PipelineConfig::from_lookup(lookup(&[(ENV_UPDATE_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_UPDATE_TIMEOUT_SECS, .. }));
    }
}
