//! Vista tipada del input de una ejecución.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{ "PerformDelete": bool, ...parámetros }`. Los parámetros que el pipeline
/// no conoce se conservan en `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkflowInput {
    #[serde(rename = "PerformDelete", default)]
    pub perform_delete: bool,
    #[serde(rename = "DatasetName", default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "ForecastSchedule", default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowInput {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_parameters_are_kept() {
        let v = json!({"PerformDelete": true, "DatasetName": "sales", "bucket": "b", "key": "train/a.csv", "Horizon": 14});
        let input = WorkflowInput::from_value(&v).unwrap();
        assert!(input.perform_delete);
        assert_eq!(input.dataset_name.as_deref(), Some("sales"));
        assert_eq!(input.extra["Horizon"], json!(14));
        assert_eq!(input.to_value(), v);
    }

    #[test]
    fn missing_flag_defaults_to_false() {
        let input = WorkflowInput::from_value(&json!({})).unwrap();
        assert!(!input.perform_delete);
    }

    #[test]
    fn string_flag_is_not_a_boolean() {
        assert!(WorkflowInput::from_value(&json!({"PerformDelete": "true"})).is_err());
    }
}
