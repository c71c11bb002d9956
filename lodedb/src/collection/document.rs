use crate::common::{FieldPath, FieldValue};
use crate::errors::{ErrorKind, LodeError, LodeResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// A stored document: an id paired with an opaque serialized payload.
///
/// The payload is JSON text and is never interpreted by the document store.
/// The query engine and the index store parse it on demand. A `Document` is
/// immutable; updates replace the whole value under the same id.
///
/// The serialized form of a `Document` is also its on-disk envelope:
/// `{"id": "...", "payload": "<json text>"}`.
///
/// # Examples
///
/// ```rust
/// use lodedb::collection::Document;
/// use lodedb::common::FieldValue;
/// use serde_json::json;
///
/// let doc = Document::from_value("u1", &json!({"name": "Alice", "age": 25}));
/// assert_eq!(doc.id(), "u1");
/// assert_eq!(doc.get("age"), FieldValue::from(25));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    id: String,
    payload: String,
}

impl Document {
    /// Creates a document from an id and already-serialized payload text.
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Creates a document from a JSON tree.
    pub fn from_value(id: impl Into<String>, value: &serde_json::Value) -> Self {
        Document {
            id: id.into(),
            payload: value.to_string(),
        }
    }

    /// Creates a document by serializing any `Serialize` type.
    ///
    /// # Errors
    ///
    /// Returns `ObjectMappingError` if the object cannot be serialized.
    pub fn from_object<T: Serialize>(id: impl Into<String>, object: &T) -> LodeResult<Self> {
        let payload = serde_json::to_string(object).map_err(|err| {
            log::error!("Failed to serialize object into a document: {}", err);
            LodeError::new(
                &format!("Failed to serialize object: {}", err),
                ErrorKind::ObjectMappingError,
            )
        })?;
        Ok(Document {
            id: id.into(),
            payload,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Parses the payload into a JSON tree.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` if the payload is not valid JSON.
    pub fn value(&self) -> LodeResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    /// Parses the payload into a typed object.
    ///
    /// # Errors
    ///
    /// Returns `ObjectMappingError` if the payload does not fit `T`.
    pub fn to_object<T: DeserializeOwned>(&self) -> LodeResult<T> {
        serde_json::from_str(&self.payload).map_err(|err| {
            LodeError::new(
                &format!("Failed to map document {} to object: {}", self.id, err),
                ErrorKind::ObjectMappingError,
            )
        })
    }

    /// Resolves a dot-separated field path against the payload.
    ///
    /// Returns [FieldValue::Null] for absent fields and for payloads that do
    /// not parse.
    pub fn get(&self, field: &str) -> FieldValue {
        match self.value() {
            Ok(value) => FieldPath::new(field).resolve(&value),
            Err(_) => FieldValue::Null,
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document({}: {})", self.id, self.payload)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.payload)
    }
}
