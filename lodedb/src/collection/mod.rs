//! Collections and documents.
//!
//! # Documents
//!
//! A [Document] pairs an id with a serialized JSON payload. The payload has
//! no schema; fields are addressed with dot-separated paths.
//!
//! ```rust
//! use lodedb::collection::Document;
//! use lodedb::common::FieldValue;
//! use serde_json::json;
//!
//! let doc = Document::from_value("u1", &json!({"address": {"city": "Oslo"}}));
//! assert_eq!(doc.get("address.city"), FieldValue::from("Oslo"));
//! ```
//!
//! # Collections
//!
//! A [Collection] is a named set of documents and their indexes, obtained from
//! a [Database](crate::Database). Collections support:
//! - Insert, update and delete, by id or by query
//! - Declarative queries with sorting and pagination
//! - Single-field hash indexes
//!
//! ```rust
//! use lodedb::query::Query;
//! use lodedb::Database;
//! use serde_json::json;
//!
//! let db = Database::open_in_memory().unwrap();
//! let users = db.collection("users").unwrap();
//! users.insert(json!({"name": "Alice", "age": 30})).unwrap();
//!
//! let found = users.find(&Query::new().eq("age", 30)).unwrap();
//! assert_eq!(found.len(), 1);
//! ```

mod db_collection;
mod document;

pub use db_collection::*;
pub use document::*;
