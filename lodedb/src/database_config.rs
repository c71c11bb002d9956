//! Configuration of a database instance.

use crate::common::{FIELD_SEPARATOR, IN_MEMORY_PATH};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings shared by every component of an open database.
///
/// A config without a path describes an in-memory database. Configs are
/// immutable once built and cheap to clone.
///
/// # Examples
///
/// ```rust
/// use lodedb::DatabaseConfig;
///
/// let config = DatabaseConfig::from_path(":memory:");
/// assert!(config.is_in_memory());
///
/// let config = DatabaseConfig::from_path("/tmp/lode");
/// assert_eq!(config.db_path().unwrap().to_str(), Some("/tmp/lode"));
/// assert_eq!(config.field_separator(), '.');
/// ```
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    inner: Arc<DatabaseConfigInner>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::new(None, false)
    }
}

impl DatabaseConfig {
    /// Creates a config rooted at `db_path`, or in-memory when `None`.
    pub fn new(db_path: Option<PathBuf>, pretty_print: bool) -> Self {
        DatabaseConfig {
            inner: Arc::new(DatabaseConfigInner {
                db_path,
                pretty_print,
            }),
        }
    }

    /// Creates a config for `path`; the `":memory:"` sentinel selects
    /// in-memory mode.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        DatabaseConfig::new(resolve_path(path.as_ref()), false)
    }

    /// Root directory of the database; `None` in in-memory mode.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.inner.db_path.clone()
    }

    pub fn is_in_memory(&self) -> bool {
        self.inner.db_path.is_none()
    }

    /// Whether document and index files are written as indented JSON.
    pub fn pretty_print(&self) -> bool {
        self.inner.pretty_print
    }

    /// Separator between the segments of a field path.
    pub fn field_separator(&self) -> char {
        FIELD_SEPARATOR
    }
}

#[derive(Debug)]
struct DatabaseConfigInner {
    db_path: Option<PathBuf>,
    pretty_print: bool,
}

pub(crate) fn resolve_path(path: &Path) -> Option<PathBuf> {
    if path.as_os_str() == IN_MEMORY_PATH {
        None
    } else {
        Some(path.to_path_buf())
    }
}
