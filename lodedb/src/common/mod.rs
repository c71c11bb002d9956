//! Shared building blocks: the scalar value model, field paths, sort
//! directions, per-collection locks and path constants.
//!
//! ```rust
//! use lodedb::common::{FieldPath, FieldValue};
//! use serde_json::json;
//!
//! let age = FieldPath::new("age");
//! assert_eq!(age.resolve(&json!({"age": 30})), FieldValue::from(30));
//! ```

mod constants;
mod fields;
mod lock;
mod sort_order;
mod validation;
mod value;

pub use constants::*;
pub use fields::*;
pub use lock::*;
pub use sort_order::*;
pub use validation::*;
pub use value::*;
