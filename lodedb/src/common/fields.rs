use crate::common::{FieldValue, FIELD_SEPARATOR};
use smallvec::SmallVec;
use std::fmt::Display;

type Segments = SmallVec<[String; 4]>;

/// A dot-separated address into a document's JSON tree, split once up front.
///
/// Resolution descends through object levels only. It yields
/// [FieldValue::Null] when a level is missing or when an intermediate level is
/// not an object, so `"address.city"` against `{"address": "n/a"}` is absent.
/// A path that lands on an array or object yields [FieldValue::Other].
///
/// # Examples
///
/// ```rust
/// use lodedb::common::{FieldPath, FieldValue};
/// use serde_json::json;
///
/// let path = FieldPath::new("address.city");
/// let doc = json!({"address": {"city": "Oslo"}});
/// assert_eq!(path.resolve(&doc), FieldValue::from("Oslo"));
/// assert_eq!(path.resolve(&json!({"address": []})), FieldValue::Null);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    path: String,
    segments: Segments,
}

impl FieldPath {
    pub fn new(path: &str) -> FieldPath {
        FieldPath {
            path: path.to_string(),
            segments: path.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// The path as originally written.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Resolves this path against a parsed document payload.
    pub fn resolve(&self, value: &serde_json::Value) -> FieldValue {
        let mut current = value;
        for segment in self.segments.iter() {
            match current {
                serde_json::Value::Object(map) => match map.get(segment) {
                    Some(next) => current = next,
                    None => return FieldValue::Null,
                },
                _ => return FieldValue::Null,
            }
        }
        FieldValue::from_json(current)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath::new(path)
    }
}

/// Resolves a dot-separated `path` against `value`.
///
/// Convenience for one-off lookups; hot paths keep a [FieldPath] around.
pub fn resolve_field(value: &serde_json::Value, path: &str) -> FieldValue {
    FieldPath::new(path).resolve(value)
}
