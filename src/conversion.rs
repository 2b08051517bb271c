//! Conversions between [`Value`] and `serde_json::Value`, plus scalar `From`
//! impls so conditions can be written inline.

use std::collections::BTreeMap;

use crate::value::Value;

impl From<serde_json::Value> for Value {
    fn from(raw: serde_json::Value) -> Value {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(key, value)| (key, Value::from(value))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            // Non-finite numbers have no JSON representation
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect()),
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(key, value)| (key, serde_json::Value::from(value))).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value { Value::Bool(b) }
}
impl From<f64> for Value {
    fn from(n: f64) -> Value { Value::Number(n) }
}
impl From<i64> for Value {
    fn from(n: i64) -> Value { Value::Number(n as f64) }
}
impl From<i32> for Value {
    fn from(n: i32) -> Value { Value::Number(n as f64) }
}
impl From<u32> for Value {
    fn from(n: u32) -> Value { Value::Number(n as f64) }
}
impl From<&str> for Value {
    fn from(s: &str) -> Value { Value::String(s.to_string()) }
}
impl From<String> for Value {
    fn from(s: String) -> Value { Value::String(s) }
}
impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value { Value::Array(items) }
}
impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Value { Value::Object(map) }
}
