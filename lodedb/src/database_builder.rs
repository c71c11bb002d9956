use crate::database::Database;
use crate::database_config::{resolve_path, DatabaseConfig};
use crate::errors::{ErrorKind, LodeError, LodeResult};
use std::path::{Path, PathBuf};

/// Builder for [Database] instances.
///
/// Setters never fail on their own; the first invalid setting is remembered
/// and reported by [DatabaseBuilder::open].
///
/// # Examples
///
/// ```rust
/// use lodedb::Database;
///
/// let db = Database::builder().in_memory().open().unwrap();
/// assert!(db.config().is_in_memory());
/// ```
#[derive(Default)]
pub struct DatabaseBuilder {
    error: Option<LodeError>,
    db_path: Option<PathBuf>,
    pretty_print: bool,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        DatabaseBuilder::default()
    }

    /// Roots the database at `path`. The `":memory:"` sentinel selects
    /// in-memory mode.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            if self.error.is_none() {
                log::error!("Database path cannot be empty");
                self.error = Some(LodeError::new(
                    "Database path cannot be empty",
                    ErrorKind::InvalidOperation,
                ));
            }
            return self;
        }
        self.db_path = resolve_path(path);
        self
    }

    /// Keeps everything in memory; nothing touches the filesystem.
    pub fn in_memory(mut self) -> Self {
        self.db_path = None;
        self
    }

    /// Writes document and index files as indented JSON.
    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    /// Builds the config without opening a database.
    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.db_path.clone(), self.pretty_print)
    }

    /// Opens the database, creating its root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a setter, or an I/O error if the
    /// root directory cannot be created.
    pub fn open(self) -> LodeResult<Database> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Database::with_config(self.config())
    }
}
