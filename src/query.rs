use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::Value;

/// A filter document: an ordered mapping from dot-path strings to match
/// conditions. This is the sole wire shape the compiler accepts.
///
/// Insertion order is preserved (a plain map would reorder keys) so that
/// assembly and debug output are deterministic in the caller's path order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<(String, Value)>,
}

impl Query {
    pub fn new() -> Query { Query::default() }

    pub fn insert(&mut self, path: impl Into<String>, condition: impl Into<Value>) {
        self.conditions.push((path.into(), condition.into()));
    }

    /// Builder-style [`insert`](Query::insert).
    pub fn with(mut self, path: impl Into<String>, condition: impl Into<Value>) -> Query {
        self.insert(path, condition);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(path, condition)| (path.as_str(), condition))
    }

    pub fn len(&self) -> usize { self.conditions.len() }

    pub fn is_empty(&self) -> bool { self.conditions.is_empty() }
}

impl FromIterator<(String, Value)> for Query {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Query {
        Query { conditions: iter.into_iter().collect() }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.conditions.len()))?;
        for (path, condition) in &self.conditions {
            map.serialize_entry(path, condition)?;
        }
        map.end()
    }
}

struct QueryVisitor;

impl<'de> Visitor<'de> for QueryVisitor {
    type Value = Query;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map of dot-path strings to match conditions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Query, A::Error> {
        let mut conditions = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry::<String, Value>()? {
            conditions.push(entry);
        }
        Ok(Query { conditions })
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Query, D::Error> {
        deserializer.deserialize_map(QueryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_preserves_insertion_order() {
        let query = Query::new().with("z", Value::from(1.0)).with("a", Value::from(2.0));
        let paths: Vec<&str> = query.iter().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["z", "a"]);
    }

    #[test]
    fn deserializes_from_a_json_map() {
        let query: Query = serde_json::from_value(json!({
            "foo.bar": "baz",
            "count": {"$eq": 3},
        }))
        .unwrap();
        assert_eq!(query.len(), 2);
        let condition = query.iter().find(|(path, _)| *path == "count").unwrap().1;
        assert_eq!(condition, &Value::from(json!({"$eq": 3})));
    }

    #[test]
    fn serializes_back_to_a_map() {
        let query = Query::new().with("foo", Value::from("bar"));
        let raw = serde_json::to_value(&query).unwrap();
        assert_eq!(raw, json!({"foo": "bar"}));
    }
}
