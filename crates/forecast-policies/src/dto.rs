//! Forma serializable (camelCase) de las reglas de retry/catch.

use std::time::Duration;

use forecast_core::hashing::{hash_str, to_canonical_json};
use forecast_core::{CatchRule, ErrorMatcher, RetryRule};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_INTERVAL_SECONDS: u32 = 1;
const DEFAULT_BACKOFF_RATE: f64 = 2.0;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("errorEquals must not be empty")] EmptyMatchers,
    #[error("interval must be a whole number of seconds (got {0:?})")] FractionalInterval(Duration),
    #[error("invalid retry policy: {0}")] InvalidRetry(String),
    #[error("serialization error: {0}")] Serde(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub error_equals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchPolicy {
    pub error_equals: Vec<String>,
    pub next: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
}

impl RetryPolicy {
    /// Convierte a `RetryRule` aplicando defaults (1 s, 2.0, 3) y validando.
    pub fn to_rule(&self) -> Result<RetryRule, PolicyError> {
        if self.error_equals.is_empty() {
            return Err(PolicyError::EmptyMatchers);
        }
        let rule = RetryRule::new(self.error_equals.iter().map(String::as_str))
            .with_interval(Duration::from_secs(u64::from(self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS))))
            .with_backoff_rate(self.backoff_rate.unwrap_or(DEFAULT_BACKOFF_RATE))
            .with_max_attempts(self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS));
        rule.validate().map_err(PolicyError::InvalidRetry)?;
        Ok(rule)
    }
}

impl TryFrom<&RetryRule> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(rule: &RetryRule) -> Result<Self, Self::Error> {
        if rule.interval.subsec_nanos() != 0 {
            return Err(PolicyError::FractionalInterval(rule.interval));
        }
        let secs = u32::try_from(rule.interval.as_secs()).map_err(|e| PolicyError::InvalidRetry(e.to_string()))?;
        Ok(Self { error_equals: matcher_names(&rule.matchers),
                  interval_seconds: Some(secs),
                  backoff_rate: Some(rule.backoff_rate),
                  max_attempts: Some(rule.max_attempts) })
    }
}

impl CatchPolicy {
    pub fn to_rule(&self) -> Result<CatchRule, PolicyError> {
        if self.error_equals.is_empty() {
            return Err(PolicyError::EmptyMatchers);
        }
        let rule = CatchRule::new(self.error_equals.iter().map(String::as_str), self.next.as_str());
        Ok(match &self.result_path {
            Some(path) => rule.with_result_path(path.trim_start_matches("$.")),
            None => rule,
        })
    }
}

impl From<&CatchRule> for CatchPolicy {
    fn from(rule: &CatchRule) -> Self {
        Self { error_equals: matcher_names(&rule.matchers),
               next: rule.next.clone(),
               result_path: rule.result_path.clone() }
    }
}

fn matcher_names(matchers: &[ErrorMatcher]) -> Vec<String> {
    matchers.iter().map(|m| m.as_str().to_string()).collect()
}

/// Hash estable de una política, basado en JSON canónico.
pub fn policy_hash<T: Serialize>(policy: &T) -> Result<String, PolicyError> {
    let value = serde_json::to_value(policy).map_err(|e| PolicyError::Serde(e.to_string()))?;
    Ok(hash_str(&to_canonical_json(&value)))
}
