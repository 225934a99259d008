//! Deep-partial query patterns for contract search.
//!
//! A `Query<T>` constrains any subset of the fields of a record type `T`,
//! and any subset of the fields of nested records, recursively. Leaf
//! fields are compared for equality. Rust has no type-level way to derive
//! "T with every field optional", so the pattern is built at runtime and
//! `T` only tags which payload type the query was written for.

use std::fmt;
use std::marker::PhantomData;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A search pattern over payloads of type `T`.
pub struct Query<T> {
    pattern: Map<String, Value>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Query<T> {
    /// The empty query, which matches every record.
    pub fn new() -> Self {
        Query {
            pattern: Map::new(),
            _payload: PhantomData,
        }
    }

    /// Require `name` to match `value`. Object values match structurally:
    /// only the members they mention are compared.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pattern.insert(name.into(), value.into());
        self
    }

    /// Constrain the record-typed field `name` with a sub-query.
    pub fn nested<U>(mut self, name: impl Into<String>, query: Query<U>) -> Self {
        self.pattern.insert(name.into(), Value::Object(query.pattern));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// The pattern as sent to the ledger's search endpoint.
    pub fn as_value(&self) -> Value {
        Value::Object(self.pattern.clone())
    }

    /// Whether `value` satisfies every constraint of this query.
    pub fn matches(&self, value: &Value) -> bool {
        matches_record(&self.pattern, value)
    }
}

fn matches_record(pattern: &Map<String, Value>, value: &Value) -> bool {
    let Some(record) = value.as_object() else {
        return false;
    };
    pattern.iter().all(|(name, expected)| {
        record
            .get(name)
            .is_some_and(|actual| matches_value(expected, actual))
    })
}

fn matches_value(expected: &Value, actual: &Value) -> bool {
    match expected {
        Value::Object(sub) => matches_record(sub, actual),
        leaf => leaf == actual,
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Query::new()
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            pattern: self.pattern.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> PartialEq for Query<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&self.pattern).finish()
    }
}

impl<T> Serialize for Query<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.pattern.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Iou;
    struct Address;

    fn iou() -> Value {
        json!({
            "issuer": "Bank",
            "owner": "Alice",
            "amount": "100.0",
            "address": {"city": "Zurich", "zip": "8000"}
        })
    }

    #[test]
    fn test_empty_query_matches_any_record() {
        let q = Query::<Iou>::new();
        assert!(q.is_empty());
        assert!(q.matches(&iou()));
        assert!(q.matches(&json!({})));
        assert!(!q.matches(&json!("not a record")));
    }

    #[test]
    fn test_leaf_fields() {
        let q = Query::<Iou>::new().field("owner", "Alice").field("issuer", "Bank");
        assert!(q.matches(&iou()));
        let q = Query::<Iou>::new().field("owner", "Bob");
        assert!(!q.matches(&iou()));
        let q = Query::<Iou>::new().field("missing", "x");
        assert!(!q.matches(&iou()));
    }

    #[test]
    fn test_nested_partial_record() {
        let q = Query::<Iou>::new().nested("address", Query::<Address>::new().field("city", "Zurich"));
        assert!(q.matches(&iou()));
        let q = Query::<Iou>::new().nested("address", Query::<Address>::new().field("city", "Bern"));
        assert!(!q.matches(&iou()));
    }

    #[test]
    fn test_object_value_matches_structurally() {
        let q = Query::<Iou>::new().field("address", json!({"zip": "8000"}));
        assert!(q.matches(&iou()));
    }

    #[test]
    fn test_serializes_to_pattern() {
        let q = Query::<Iou>::new()
            .field("owner", "Alice")
            .nested("address", Query::<Address>::new().field("zip", "8000"));
        let expected = json!({"owner": "Alice", "address": {"zip": "8000"}});
        assert_eq!(serde_json::to_value(&q).unwrap(), expected);
        assert_eq!(q.as_value(), expected);
        assert_eq!(q.clone(), q);
    }
}
