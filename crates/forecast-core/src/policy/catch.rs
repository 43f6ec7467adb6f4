use serde_json::{json, Value};

use super::ErrorMatcher;
use crate::errors::StepError;
use crate::injection::with_field;

/// Regla de catch: errores que coinciden se enrutan a `next`.
///
/// Con `result_path = Some(field)` el error queda en ese campo y el resto del
/// payload de entrada del estado fallido se conserva; con `None` el payload se
/// reemplaza por el objeto de error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchRule {
    pub matchers: Vec<ErrorMatcher>,
    pub next: String,
    pub result_path: Option<String>,
}

impl CatchRule {
    pub fn new<I, M>(matchers: I, next: impl Into<String>) -> Self
        where I: IntoIterator<Item = M>,
              M: Into<ErrorMatcher>
    {
        Self { matchers: matchers.into_iter().map(Into::into).collect(),
               next: next.into(),
               result_path: None }
    }

    /// Catch-all (`States.ALL`) hacia `next`.
    pub fn all(next: impl Into<String>) -> Self {
        Self { matchers: vec![ErrorMatcher::All],
               next: next.into(),
               result_path: None }
    }

    pub fn with_result_path(mut self, field: impl Into<String>) -> Self {
        self.result_path = Some(field.into());
        self
    }

    pub fn matches(&self, error: &StepError) -> bool {
        self.matchers.iter().any(|m| m.matches(error))
    }

    pub fn is_catch_all(&self) -> bool {
        self.matchers.iter().any(ErrorMatcher::is_catch_all)
    }

    /// Payload que recibe el estado de recuperación.
    pub fn recovery_payload(&self, input: &Value, error: &StepError) -> Value {
        match &self.result_path {
            Some(field) => with_field(input, field, error.to_payload()),
            None => error.to_payload(),
        }
    }

    pub fn describe(&self) -> Value {
        json!({
            "ErrorEquals": self.matchers.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
            "Next": self.next,
            "ResultPath": self.result_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_path_keeps_main_payload() {
        let rule = CatchRule::all("Failed").with_result_path("serviceError");
        let out = rule.recovery_payload(&json!({"PerformDelete": true, "DatasetName": "d"}),
                                        &StepError::terminal("ResourceFailedException", "bad csv"));
        assert_eq!(out["PerformDelete"], json!(true));
        assert_eq!(out["DatasetName"], json!("d"));
        assert_eq!(out["serviceError"]["Error"], json!("ResourceFailedException"));
        assert_eq!(out["serviceError"]["Cause"], json!("bad csv"));
    }
}
