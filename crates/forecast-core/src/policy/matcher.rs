use serde::{Deserialize, Serialize};

use crate::errors::{StepError, ALL_ERRORS};

/// Matcher de nombre de error para reglas de retry/catch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorMatcher {
    Named(String),
    /// `States.ALL`: cualquier error, incluidos los no clasificados.
    All,
}

impl ErrorMatcher {
    pub fn parse(name: &str) -> Self {
        if name == ALL_ERRORS {
            ErrorMatcher::All
        } else {
            ErrorMatcher::Named(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorMatcher::Named(n) => n,
            ErrorMatcher::All => ALL_ERRORS,
        }
    }

    pub fn matches(&self, error: &StepError) -> bool {
        match self {
            ErrorMatcher::All => true,
            ErrorMatcher::Named(n) => n == error.kind(),
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, ErrorMatcher::All)
    }
}

impl From<&str> for ErrorMatcher {
    fn from(value: &str) -> Self {
        ErrorMatcher::parse(value)
    }
}
