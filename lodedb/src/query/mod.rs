//! Declarative queries and their evaluation.
//!
//! A [Query] is a list of AND-ed [Condition]s with optional sort
//! keys, `skip` and `limit`. The [QueryEngine] evaluates it against a
//! collection, using at most one index to narrow the candidates.
//!
//! ```rust
//! use lodedb::query::Query;
//! use serde_json::json;
//!
//! let query = Query::new().eq("active", true).gt("age", 25);
//! assert!(query.matches(&json!({"active": true, "age": 30})));
//! assert!(!query.matches(&json!({"active": false, "age": 30})));
//! ```

mod builder;
mod condition;
mod engine;
mod plan;

pub use builder::*;
pub use condition::*;
pub use engine::*;
pub use plan::*;
