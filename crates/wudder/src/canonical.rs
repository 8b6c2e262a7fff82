//! Deterministic JSON serialization for signed payloads.
//!
//! Payloads that are signed or compared byte-for-byte (private keys,
//! prepared transactions) are sent as compact JSON with every object's keys
//! sorted, so the same value always produces the same string.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::InvalidInputError;

/// Serialize `value` as compact JSON with recursively sorted object keys.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, InvalidInputError> {
    let value = serde_json::to_value(value)?;
    Ok(sorted(value).to_string())
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::new();
            for (key, value) in entries {
                out.insert(key, sorted(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
