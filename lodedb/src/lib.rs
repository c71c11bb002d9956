//! # LodeDB - Embedded Document Store
//!
//! LodeDB is a small embedded document database. Callers open a database rooted
//! at a directory, or in memory, obtain named collections and run CRUD
//! operations and queries over schemaless JSON documents, optionally sped up by
//! single-field indexes.
//!
//! ## Key Features
//!
//! - **Embedded**: no server process, a library call away
//! - **Schemaless**: any JSON value can be stored; fields are addressed by
//!   dot-separated paths
//! - **Queries**: equality, range, pattern, membership and existence
//!   conditions with multi-key sorting, `skip` and `limit`
//! - **Indexes**: hash indexes that narrow equality queries without ever
//!   changing their results
//! - **Persistence**: one JSON file per document, written through, and one per
//!   index, written on commit and close and reconciled on open
//! - **Thread-safe**: per-collection reader/writer locks; handles are cheap to
//!   clone and share
//!
//! ## Quick Start
//!
//! ```rust
//! use lodedb::query::Query;
//! use lodedb::Database;
//! use serde_json::json;
//!
//! # fn main() -> lodedb::errors::LodeResult<()> {
//! let dir = tempfile::tempdir()?;
//! let db = Database::open(dir.path())?;
//!
//! let users = db.collection("users")?;
//! users.create_index("email")?;
//! users.insert(json!({"name": "John Doe", "email": "john@example.com", "age": 30}))?;
//! users.insert(json!({"name": "Jane Smith", "email": "jane@example.com", "age": 25}))?;
//!
//! let john = users.find_one(&Query::new().eq("email", "john@example.com"))?;
//! assert!(john.is_some());
//!
//! let older = users.find(&Query::new().gt("age", 25).sort_asc("age"))?;
//! assert_eq!(older.len(), 1);
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents and collection handles
//! - [`common`] - Value model, field paths, locks and validation
//! - [`errors`] - Error types and result definitions
//! - [`index`] - Single-field hash indexes
//! - [`query`] - Query builder and query engine
//! - [`store`] - Document persistence

pub mod collection;
pub mod common;
mod database;
mod database_builder;
mod database_config;
pub mod errors;
pub mod index;
pub mod query;
mod stats;
pub mod store;

pub use database::Database;
pub use database_builder::DatabaseBuilder;
pub use database_config::DatabaseConfig;
pub use stats::DatabaseStats;
