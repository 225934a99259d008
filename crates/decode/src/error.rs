//! Validation errors and JSON path tracking.

use std::fmt;

use serde_json::Value;

/// One step from a JSON value into one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object member.
    Key(String),
    /// An array element.
    Index(usize),
}

/// Location of a value inside a decoded JSON document, root first.
///
/// Renders as `$` for the root, `$.signatories[1]` for nested values, and
/// `$["odd key"]` for keys that are not plain identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// The path of the document root.
    pub fn root() -> Self {
        JsonPath::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) if is_plain_key(key) => write!(f, ".{}", key)?,
                // Value::String's Display is the quoted, escaped JSON form.
                PathSegment::Key(key) => write!(f, "[{}]", Value::String(key.clone()))?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A decode failure: what was expected, and where.
///
/// Validation errors are plain values. Combinators add the location of the
/// failing child with [`ValidationError::at_key`] and
/// [`ValidationError::at_index`] as the error travels back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at {path}: {message}")]
pub struct ValidationError {
    path: JsonPath,
    message: String,
}

impl ValidationError {
    /// An error located at the value currently being decoded.
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError {
            path: JsonPath::root(),
            message: message.into(),
        }
    }

    /// Shape mismatch: `expected <what>, got <kind of found>`.
    pub fn expected(what: &str, found: &Value) -> Self {
        ValidationError::new(format!("expected {}, got {}", what, kind_of(found)))
    }

    /// A required object member is absent.
    pub fn missing_key(key: &str) -> Self {
        ValidationError::new(format!(
            "the key '{}' is required but was not present",
            key
        ))
    }

    /// Locate this error under the object member `key`.
    pub fn at_key(mut self, key: &str) -> Self {
        self.path.prepend(PathSegment::Key(key.to_string()));
        self
    }

    /// Locate this error under the array element `index`.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.prepend(PathSegment::Index(index));
        self
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from decoding JSON text rather than an already parsed value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The text is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON is well-formed but does not have the expected shape.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl DecodeError {
    /// The validation error, if the text parsed but failed to decode.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            DecodeError::Invalid(e) => Some(e),
            DecodeError::Json(_) => None,
        }
    }
}

/// Human-readable JSON kind used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_path_display() {
        assert_eq!(JsonPath::root().to_string(), "$");
        assert!(JsonPath::root().is_root());
    }

    #[test]
    fn test_segments_prepend_outward() {
        let err = ValidationError::new("boom").at_index(1).at_key("signatories");
        assert_eq!(err.path().to_string(), "$.signatories[1]");
        assert_eq!(
            err.path().segments(),
            &[
                PathSegment::Key("signatories".to_string()),
                PathSegment::Index(1)
            ]
        );
        assert_eq!(err.to_string(), "at $.signatories[1]: boom");
    }

    #[test]
    fn test_non_identifier_keys_are_quoted() {
        let err = ValidationError::new("x").at_key("has space").at_key("map");
        assert_eq!(err.path().to_string(), "$.map[\"has space\"]");
        let err = ValidationError::new("x").at_key("1st");
        assert_eq!(err.path().to_string(), "$[\"1st\"]");
    }

    #[test]
    fn test_expected_message() {
        let err = ValidationError::expected("a string", &json!(42));
        assert_eq!(err.message(), "expected a string, got a number");
        let err = ValidationError::expected("a boolean", &json!(null));
        assert_eq!(err.message(), "expected a boolean, got null");
    }

    #[test]
    fn test_missing_key_message() {
        let err = ValidationError::missing_key("agreementText");
        assert_eq!(
            err.message(),
            "the key 'agreementText' is required but was not present"
        );
    }

    #[test]
    fn test_decode_error_exposes_validation() {
        let err: DecodeError = ValidationError::new("bad").into();
        assert_eq!(err.validation().map(|e| e.message()), Some("bad"));
        assert_eq!(err.to_string(), "at $: bad");

        let parse_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err: DecodeError = parse_err.into();
        assert!(err.validation().is_none());
        assert!(err.to_string().starts_with("malformed JSON"));
    }
}
