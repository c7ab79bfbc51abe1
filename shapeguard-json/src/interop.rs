//! Conversions between [`Value`] and [`serde_json::Value`].
//!
//! Converting into `serde_json` is lossy for numbers that do not fit in
//! `i64`/`u64`/`f64`: very large integers and high-precision decimals are
//! rounded to the nearest `f64`.

use shapeguard_core::{Map, Number, Value};

/// Convert a `serde_json` value.
pub fn from_serde(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => from_serde_number(&n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_serde).collect()),
        serde_json::Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, from_serde(v)))
                .collect::<Map>(),
        ),
    }
}

fn from_serde_number(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Number(Number::Integer(i));
    }
    if let Some(u) = n.as_u64() {
        return Value::Number(Number::from(u));
    }
    n.as_f64()
        .and_then(|f| Number::from_f64(f).ok())
        .map_or(Value::Null, Value::Number)
}

/// Convert into a `serde_json` value.
pub fn to_serde(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => to_serde_number(n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_serde).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_serde(v)))
                .collect(),
        ),
    }
}

fn to_serde_number(n: &Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        return serde_json::Value::from(i);
    }
    if let Some(u) = n.as_big_int().and_then(|big| u64::try_from(big).ok()) {
        return serde_json::Value::from(u);
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or(serde_json::Value::Null, serde_json::Value::Number)
}
