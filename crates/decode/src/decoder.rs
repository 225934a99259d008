//! The `Decoder<T>` type, leaf decoders, and combinators.
//!
//! Every decoder is deterministic: objects decode their members in the
//! order the caller asks for them, arrays in index order, so the first
//! reported error for a given input never changes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use crate::error::{kind_of, DecodeError, ValidationError};

type DecodeFn<T> = dyn Fn(&Value) -> Result<T, ValidationError> + Send + Sync;

/// A validating parser from untyped JSON to `T`.
///
/// Cloning is cheap: clones share the same underlying function.
pub struct Decoder<T> {
    run: Arc<DecodeFn<T>>,
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Decoder {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decoder<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Decoder<T> {
    /// Wrap a decoding function.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&Value) -> Result<T, ValidationError> + Send + Sync + 'static,
    {
        Decoder { run: Arc::new(run) }
    }

    pub fn decode(&self, value: &Value) -> Result<T, ValidationError> {
        (self.run)(value)
    }

    /// Parse `text` as JSON, then decode it.
    pub fn decode_str(&self, text: &str) -> Result<T, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.decode(&value)?)
    }

    /// Transform a successfully decoded value.
    pub fn map<U, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Decoder::new(move |value| self.decode(value).map(&f))
    }

    /// Apply a further check or conversion to a decoded value.
    ///
    /// A rejection is reported at the path of the value being decoded.
    pub fn and_then<U, E, F>(self, f: F) -> Decoder<U>
    where
        U: 'static,
        E: fmt::Display,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        Decoder::new(move |value| {
            let decoded = self.decode(value)?;
            f(decoded).map_err(|e| ValidationError::new(e.to_string()))
        })
    }

    /// A decoder whose inner decoder is built on first use.
    ///
    /// `make` runs at most once per returned decoder (the result is kept in
    /// a `OnceLock`). This is what lets a type refer to itself: the
    /// recursive reference is only expanded when input actually nests.
    pub fn lazy<F>(make: F) -> Self
    where
        F: Fn() -> Decoder<T> + Send + Sync + 'static,
    {
        let cell: OnceLock<Decoder<T>> = OnceLock::new();
        Decoder::new(move |value| {
            let inner = cell.get_or_init(|| {
                tracing::trace!(ty = std::any::type_name::<T>(), "building lazy decoder");
                make()
            });
            inner.decode(value)
        })
    }
}

// ── Leaf decoders ───────────────────────────────────────────────────

/// Accepts any JSON string.
pub fn string() -> Decoder<String> {
    Decoder::new(|value| match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::expected("a string", other)),
    })
}

/// Accepts a JSON boolean.
pub fn boolean() -> Decoder<bool> {
    Decoder::new(|value| match value {
        Value::Bool(b) => Ok(*b),
        other => Err(ValidationError::expected("a boolean", other)),
    })
}

/// Accepts only `{}`.
pub fn empty_object() -> Decoder<()> {
    Decoder::new(|value| match value {
        Value::Object(map) if map.is_empty() => Ok(()),
        Value::Object(_) => Err(ValidationError::new(format!(
            "expected an empty object, got {}",
            describe(value)
        ))),
        other => Err(ValidationError::expected("an empty object", other)),
    })
}

/// Accepts any JSON value unchanged.
pub fn any_json() -> Decoder<Value> {
    Decoder::new(|value| Ok(value.clone()))
}

/// Accepts exactly `expected`.
pub fn constant(expected: Value) -> Decoder<Value> {
    Decoder::new(move |value| {
        if *value == expected {
            Ok(value.clone())
        } else {
            Err(ValidationError::new(format!(
                "expected {}, got {}",
                expected, value
            )))
        }
    })
}

// ── Combinators ─────────────────────────────────────────────────────

/// A JSON array whose elements all decode with `element`.
///
/// Stops at the first invalid element and reports its index.
pub fn array<T: 'static>(element: Decoder<T>) -> Decoder<Vec<T>> {
    Decoder::new(move |value| {
        let items = value
            .as_array()
            .ok_or_else(|| ValidationError::expected("an array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| element.decode(item).map_err(|e| e.at_index(i)))
            .collect()
    })
}

/// A JSON object used as a string-keyed dictionary.
pub fn dict<T: 'static>(entry: Decoder<T>) -> Decoder<BTreeMap<String, T>> {
    Decoder::new(move |value| {
        let map = value
            .as_object()
            .ok_or_else(|| ValidationError::expected("an object", value))?;
        map.iter()
            .map(|(key, item)| {
                entry
                    .decode(item)
                    .map(|decoded| (key.clone(), decoded))
                    .map_err(|e| e.at_key(key))
            })
            .collect()
    })
}

/// `null` decodes to `None`; anything else must satisfy `inner`.
///
/// When the value is not null, `inner`'s own error is reported.
pub fn nullable<T: 'static>(inner: Decoder<T>) -> Decoder<Option<T>> {
    Decoder::new(move |value| match value {
        Value::Null => Ok(None),
        other => inner.decode(other).map(Some),
    })
}

/// The first alternative that succeeds, tried in order.
pub fn one_of<T: 'static>(alternatives: Vec<Decoder<T>>) -> Decoder<T> {
    Decoder::new(move |value| {
        let mut errors = Vec::with_capacity(alternatives.len());
        for alternative in &alternatives {
            match alternative.decode(value) {
                Ok(decoded) => return Ok(decoded),
                Err(e) => errors.push(e.to_string()),
            }
        }
        Err(ValidationError::new(format!(
            "expected a value matching one of the decoders, got the errors [{}]",
            errors.join(", ")
        )))
    })
}

/// A JSON object decoded member by member through [`Fields`].
///
/// Members not requested by `build` are ignored.
pub fn object<T, F>(build: F) -> Decoder<T>
where
    T: 'static,
    F: Fn(&Fields<'_>) -> Result<T, ValidationError> + Send + Sync + 'static,
{
    Decoder::new(move |value| match value {
        Value::Object(map) => build(&Fields { map }),
        other => Err(ValidationError::expected("an object", other)),
    })
}

/// Member access for [`object`] that keeps errors located.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Decode a member that must be present.
    pub fn required<T: 'static>(
        &self,
        key: &str,
        decoder: &Decoder<T>,
    ) -> Result<T, ValidationError> {
        match self.map.get(key) {
            Some(value) => decoder.decode(value).map_err(|e| e.at_key(key)),
            None => Err(ValidationError::missing_key(key)),
        }
    }

    /// Decode a member that may be absent. A present member must satisfy
    /// `decoder`, including when its value is `null`.
    pub fn optional<T: 'static>(
        &self,
        key: &str,
        decoder: &Decoder<T>,
    ) -> Result<Option<T>, ValidationError> {
        self.map
            .get(key)
            .map(|value| decoder.decode(value).map_err(|e| e.at_key(key)))
            .transpose()
    }

    /// The raw value of a member that must be present.
    pub fn raw(&self, key: &str) -> Result<&'a Value, ValidationError> {
        self.map
            .get(key)
            .ok_or_else(|| ValidationError::missing_key(key))
    }
}

impl fmt::Debug for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.map.keys()).finish()
    }
}

/// Describes a value for diagnostics without dumping large payloads.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("an array of {} items", items.len()),
        Value::Object(map) => format!("an object with {} keys", map.len()),
        other => kind_of(other).to_string(),
    }
}
