//! Merge "shallow": las claves de `b` reemplazan a las de `a`. Para objetos
//! anidados no se hace deep-merge; la semántica se mantiene simple y
//! predecible.

use serde_json::{Map, Value};

/// Keys from `b` override keys from `a` when both are objects.
/// Cuando alguno de los dos valores no es objeto, `b` tiene precedencia.
pub fn merge_json(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(ma), Value::Object(mb)) => {
            let mut out = ma.clone();
            for (k, v) in mb.iter() {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        (_, other) => other.clone(),
    }
}

/// Devuelve `base` con `value` colocado en el campo `field`.
///
/// Si `base` no es un objeto, queda envuelto bajo la clave `"Input"` para no
/// perder el payload original.
pub fn with_field(base: &Value, field: &str, value: Value) -> Value {
    let mut out = match base {
        Value::Object(m) => m.clone(),
        Value::Null => Map::new(),
        other => {
            let mut m = Map::new();
            m.insert("Input".to_string(), other.clone());
            m
        }
    };
    out.insert(field.to_string(), value);
    Value::Object(out)
}
