//! Document persistence: the in-memory mirror of every collection and its
//! one-file-per-document backing layout.

mod disk;
mod document_store;

pub(crate) use disk::*;
pub use document_store::*;
