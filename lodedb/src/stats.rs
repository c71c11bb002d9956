use serde::Serialize;
use std::fmt::{Display, Formatter};

/// A point-in-time summary of a database.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    collections: usize,
    total_documents: usize,
    disk_size: u64,
}

impl DatabaseStats {
    pub(crate) fn new(collections: usize, total_documents: usize, disk_size: u64) -> Self {
        DatabaseStats {
            collections,
            total_documents,
            disk_size,
        }
    }

    /// Number of known collections.
    pub fn collections(&self) -> usize {
        self.collections
    }

    /// Number of documents across all collections.
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Bytes used under the database root; `0` in in-memory mode.
    pub fn disk_size(&self) -> u64 {
        self.disk_size
    }
}

impl Display for DatabaseStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} collections, {} documents, {} bytes on disk",
            self.collections, self.total_documents, self.disk_size
        )
    }
}
