//! Param plumbing shared by the handler modules. Every helper answers with a
//! ready-to-send error response on the Err side so handlers can just `?`
//! inside a closure or match on it.

use super::error::{err, ok};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decode the whole params object into a typed payload. Unknown keys (like a
/// routing `id` next to patch fields) are ignored.
pub fn parse_params<T: DeserializeOwned>(id: &str, params: &Value) -> Result<T, Value> {
    serde_json::from_value(params.clone())
        .map_err(|e| err(id, "bad_params", e.to_string(), None))
}

pub fn require_i64(id: &str, params: &Value, key: &str) -> Result<i64, Value> {
    params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| err(id, "bad_params", format!("missing {key}"), None))
}

pub fn opt_i64(params: &Value, key: &str) -> Option<i64> {
    params.get(key).and_then(Value::as_i64)
}

pub fn require_str(id: &str, params: &Value, key: &str) -> Result<String, Value> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| err(id, "bad_params", format!("missing {key}"), None))
}

pub fn opt_str(params: &Value, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn opt_bool(params: &Value, key: &str) -> Option<bool> {
    params.get(key).and_then(Value::as_bool)
}

pub fn require_date(id: &str, params: &Value, key: &str) -> Result<NaiveDate, Value> {
    let raw = require_str(id, params, key)?;
    raw.parse()
        .map_err(|_| err(id, "bad_params", format!("{key} must be YYYY-MM-DD"), None))
}

pub fn opt_date(id: &str, params: &Value, key: &str) -> Result<Option<NaiveDate>, Value> {
    match params.get(key).and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| err(id, "bad_params", format!("{key} must be YYYY-MM-DD"), None)),
    }
}

/// One optional typed field (an enum name, a timestamp) out of the params
/// object. Explicit null reads as absent.
pub fn opt_field<T: DeserializeOwned>(id: &str, params: &Value, key: &str) -> Result<Option<T>, Value> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| err(id, "bad_params", format!("{key}: {e}"), None)),
    }
}

/// Serialize a store value into a success response.
pub fn to_result<T: Serialize>(id: &str, value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(v) => ok(id, v),
        Err(e) => err(id, "codec_failed", e.to_string(), None),
    }
}
