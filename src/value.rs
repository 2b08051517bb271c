use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::Segment;

/// A schema-less document value. Documents, match operands, and filter
/// conditions are all `Value` trees.
///
/// Equality is canonical deep equality: objects compare by key set and values
/// regardless of key order, arrays compare element-wise in order, and numbers
/// compare numerically (so `1` equals `1.0`, and `NaN` equals nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Truthiness of a value, after the coercion rules the filter language
    /// inherited from its host: null, `false`, `0`, `NaN`, and the empty
    /// string are falsy; arrays and objects (even empty ones) are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Safe traversal: follow `segments` from this value, returning `None` as
    /// soon as a link is missing or the current value cannot be indexed.
    ///
    /// An `Index` segment over an object falls back to the decimal string key,
    /// so `foo.1` reaches both the second element of an array and the `"1"`
    /// field of an object.
    pub fn resolve(&self, segments: &[Segment]) -> Option<&Value> {
        let mut current = self;
        for segment in segments {
            current = match (segment, current) {
                (Segment::Field(name), Value::Object(map)) => map.get(name)?,
                (Segment::Index(i), Value::Array(items)) => items.get(*i)?,
                (Segment::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use serde_json::json;

    fn v(raw: serde_json::Value) -> Value { Value::from(raw) }

    #[test]
    fn object_equality_ignores_key_order() {
        let a = v(json!({"x": 1, "y": 2}));
        let b = v(json!({"y": 2, "x": 1}));
        assert_eq!(a, b);

        let extra = v(json!({"x": 1, "y": 2, "z": 3}));
        assert_ne!(a, extra);
    }

    #[test]
    fn array_equality_is_order_sensitive() {
        assert_eq!(v(json!([1, 2])), v(json!([1, 2])));
        assert_ne!(v(json!([1, 2])), v(json!([2, 1])));
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(v(json!(1)), v(json!(1.0)));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(-1.5).is_truthy());
        assert!(v(json!([])).is_truthy());
        assert!(v(json!({})).is_truthy());
    }

    #[test]
    fn resolve_follows_fields_and_indices() {
        let doc = v(json!({"a": {"b": [10, {"c": "deep"}]}}));
        let path = Path::parse("a.b.1.c").unwrap();
        assert_eq!(doc.resolve(path.segments()), Some(&v(json!("deep"))));
    }

    #[test]
    fn resolve_index_over_object_uses_string_key() {
        let doc = v(json!({"a": {"1": "one"}}));
        let path = Path::parse("a.1").unwrap();
        assert_eq!(doc.resolve(path.segments()), Some(&v(json!("one"))));
    }

    #[test]
    fn resolve_degrades_to_absent() {
        let doc = v(json!({"a": "scalar"}));
        assert_eq!(doc.resolve(Path::parse("a.b").unwrap().segments()), None);
        assert_eq!(doc.resolve(Path::parse("missing").unwrap().segments()), None);
        assert_eq!(doc.resolve(Path::parse("a.0").unwrap().segments()), None);
    }

    #[test]
    fn serde_round_trip_is_untagged() {
        let doc = v(json!({"s": "x", "n": 2.5, "b": true, "z": null, "arr": [1, {"k": []}]}));
        let text = serde_json::to_string(&doc).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc, back);
    }
}
