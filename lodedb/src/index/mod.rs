//! Single-field hash indexes.
//!
//! An index maps the case-folded textual form of a field value to the ids of
//! the documents holding it. Indexes only serve exact-match lookups; the query
//! engine re-checks every condition on the candidates they return.
//!
//! ```rust
//! use lodedb::Database;
//! use serde_json::json;
//!
//! let db = Database::open_in_memory().unwrap();
//! let users = db.collection("users").unwrap();
//! users.insert(json!({"name": "Bob", "age": 30})).unwrap();
//! users.create_index("age").unwrap();
//! assert!(users.has_index("age").unwrap());
//! ```

mod field_index;
mod index_store;

pub use field_index::*;
pub use index_store::*;
