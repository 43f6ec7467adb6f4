use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TriggerError;

/// Objeto creado en un bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

/// Extrae los objetos de una notificación estilo S3
/// (`Records[].s3.bucket.name`, `Records[].s3.object.key`). Las keys llegan
/// URL-encoded con `+` en lugar de espacios.
pub fn parse_notification(value: &Value) -> Result<Vec<ObjectCreatedEvent>, TriggerError> {
    let notification: Notification =
        serde_json::from_value(value.clone()).map_err(|e| TriggerError::MalformedEvent(e.to_string()))?;
    notification.records
                .into_iter()
                .map(|r| {
                    let raw = r.s3.object.key.replace('+', " ");
                    let key = urlencoding::decode(&raw).map_err(|e| TriggerError::MalformedEvent(format!("key '{raw}': {e}")))?
                                                       .into_owned();
                    Ok(ObjectCreatedEvent { bucket: r.s3.bucket.name,
                                            key })
                })
                .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_records_and_decodes_keys() {
        let v = json!({"Records": [
            {"s3": {"bucket": {"name": "drop"}, "object": {"key": "train/my+sales%282024%29.csv", "size": 10}}},
            {"s3": {"bucket": {"name": "drop"}, "object": {"key": "other/data.json"}}}
        ]});
        let objs = parse_notification(&v).unwrap();
        assert_eq!(objs.len(), 2);
        assert_eq!(objs[0].key, "train/my sales(2024).csv");
        assert_eq!(objs[1].bucket, "drop");
    }

    #[test]
    fn missing_records_is_empty() {
        assert!(parse_notification(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn malformed_record_is_rejected() {
        let err = parse_notification(&json!({"Records": [{"s3": {"bucket": {}}}]})).unwrap_err();
        assert!(matches!(err, TriggerError::MalformedEvent(_)));
    }
}
