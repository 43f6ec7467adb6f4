use std::time::Duration;

use serde_json::{json, Value};

use super::ErrorMatcher;
use crate::errors::StepError;

/// Regla de reintento con backoff exponencial acotado.
///
/// `max_attempts` acota la cantidad de re-invocaciones posteriores a la
/// primera llamada. El retraso antes del reintento `n` (n >= 1) es
/// `interval * backoff_rate^(n-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryRule {
    pub matchers: Vec<ErrorMatcher>,
    pub interval: Duration,
    pub backoff_rate: f64,
    pub max_attempts: u32,
    /// Tope opcional del retraso calculado.
    pub max_delay: Option<Duration>,
}

impl RetryRule {
    pub fn new<I, M>(matchers: I) -> Self
        where I: IntoIterator<Item = M>,
              M: Into<ErrorMatcher>
    {
        Self { matchers: matchers.into_iter().map(Into::into).collect(),
               interval: Duration::from_secs(1),
               backoff_rate: 2.0,
               max_attempts: 3,
               max_delay: None }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_backoff_rate(mut self, rate: f64) -> Self {
        self.backoff_rate = rate;
        self
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    /// Sólo los errores transitorios se reintentan.
    pub fn applies_to(&self, error: &StepError) -> bool {
        error.is_transient() && self.matchers.iter().any(|m| m.matches(error))
    }

    /// Retraso antes del reintento número `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.interval.as_secs_f64() * self.backoff_rate.powi(exp);
        let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.matchers.is_empty() {
            return Err("retry rule without error matchers".into());
        }
        if self.max_attempts == 0 {
            return Err("retry max_attempts must be >= 1".into());
        }
        if self.interval.is_zero() {
            return Err("retry interval must be positive".into());
        }
        if !self.backoff_rate.is_finite() || self.backoff_rate < 1.0 {
            return Err(format!("retry backoff_rate must be >= 1.0 (got {})", self.backoff_rate));
        }
        Ok(())
    }

    pub fn describe(&self) -> Value {
        json!({
            "ErrorEquals": self.matchers.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
            "IntervalMillis": self.interval.as_millis() as u64,
            "BackoffRate": self.backoff_rate,
            "MaxAttempts": self.max_attempts,
            "MaxDelayMillis": self.max_delay.map(|d| d.as_millis() as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_multiplicatively() {
        let r = RetryRule::new(["ResourcePendingException"]).with_interval(Duration::from_secs(1))
                                                            .with_backoff_rate(1.5);
        assert_eq!(r.delay_for(1), Duration::from_millis(1000));
        assert_eq!(r.delay_for(2), Duration::from_millis(1500));
        assert_eq!(r.delay_for(3), Duration::from_millis(2250));
    }

    #[test]
    fn huge_exponent_saturates_instead_of_panicking() {
        let r = RetryRule::new(["X"]).with_interval(Duration::from_secs(2))
                                     .with_max_attempts(100);
        assert_eq!(r.delay_for(100), Duration::MAX);
        let capped = r.clone().with_max_delay(Duration::from_secs(60));
        assert_eq!(capped.delay_for(100), Duration::from_secs(60));
    }

    #[test]
    fn terminal_errors_are_never_retried() {
        let r = RetryRule::new(["ResourcePendingException"]);
        assert!(r.applies_to(&StepError::transient("ResourcePendingException", "")));
        assert!(!r.applies_to(&StepError::terminal("ResourcePendingException", "")));
    }

    #[test]
    fn validation_rejects_shrinking_backoff() {
        let r = RetryRule::new(["X"]).with_backoff_rate(0.5);
        assert!(r.validate().is_err());
        assert!(RetryRule::new(["X"]).validate().is_ok());
    }
}
