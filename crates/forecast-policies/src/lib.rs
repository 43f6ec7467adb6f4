//! forecast-policies: políticas de retry/catch con nombre.
//!
//! Las políticas del pipeline son configuración del único motor de
//! retry/catch de `forecast-core`: cada función devuelve reglas listas para
//! adjuntar a un `TaskState`.

use std::time::Duration;

use forecast_core::{CatchRule, RetryRule};

pub mod dto;

pub use dto::{policy_hash, CatchPolicy, PolicyError, RetryPolicy};

/// Error transitorio: el recurso remoto sigue creándose o borrándose.
pub const RESOURCE_PENDING: &str = "ResourcePendingException";
/// Error terminal: el recurso remoto quedó en estado fallido.
pub const RESOURCE_FAILED: &str = "ResourceFailedException";

/// Polling de jobs de larga duración (import, predictor, forecast).
pub fn job_polling() -> RetryRule {
    RetryRule::new([RESOURCE_PENDING]).with_interval(Duration::from_secs(1))
                                      .with_backoff_rate(1.5)
                                      .with_max_attempts(100)
}

/// Polling de borrados.
pub fn deletion_polling() -> RetryRule {
    RetryRule::new([RESOURCE_PENDING]).with_interval(Duration::from_secs(2))
                                      .with_backoff_rate(2.0)
                                      .with_max_attempts(100)
}

/// Reglas de catch de los estados previos a la rama: primero el fallo
/// conocido del recurso, luego el catch-all. Ambas llevan a `next` con el
/// error bajo `result_path`.
pub fn catch_to_failure(next: &str, result_path: &str) -> Vec<CatchRule> {
    vec![CatchRule::new([RESOURCE_FAILED], next).with_result_path(result_path),
         CatchRule::all(next).with_result_path(result_path)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::StepError;

    #[test]
    fn job_polling_matches_pending_only() {
        let r = job_polling();
        assert!(r.applies_to(&StepError::transient(RESOURCE_PENDING, "creating")));
        assert!(!r.applies_to(&StepError::transient("Throttling", "slow down")));
        assert!(!r.applies_to(&StepError::terminal(RESOURCE_PENDING, "x")));
        assert_eq!(r.delay_for(3), Duration::from_millis(2250));
        assert_eq!(r.max_attempts, 100);
    }

    #[test]
    fn deletion_polling_doubles() {
        let r = deletion_polling();
        assert_eq!(r.delay_for(1), Duration::from_secs(2));
        assert_eq!(r.delay_for(4), Duration::from_secs(16));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn catch_to_failure_orders_catch_all_last() {
        let rules = catch_to_failure("Failed", "serviceError");
        assert_eq!(rules.len(), 2);
        assert!(!rules[0].is_catch_all());
        assert!(rules[1].is_catch_all());
        assert!(rules.iter().all(|r| r.next == "Failed" && r.result_path.as_deref() == Some("serviceError")));
    }
}
