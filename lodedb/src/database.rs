use crate::collection::Collection;
use crate::common::{validate_collection_name, LockHandle, LockRegistry};
use crate::database_builder::DatabaseBuilder;
use crate::database_config::DatabaseConfig;
use crate::errors::{ErrorKind, LodeError, LodeResult};
use crate::index::IndexStore;
use crate::query::QueryEngine;
use crate::stats::DatabaseStats;
use crate::store::DocumentStore;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An open database: the entry point to every collection.
///
/// `Database` wires the [DocumentStore], the [IndexStore] and the
/// [QueryEngine] together and hands out [Collection] handles. Every write made
/// through a collection goes to the document store first and is then mirrored
/// into the indexes.
///
/// `Database` uses the PIMPL pattern: clones share one `Arc<DatabaseInner>`
/// and are safe to send across threads. The database is closed explicitly with
/// [Database::close], or implicitly when the last clone is dropped.
///
/// # Examples
///
/// ```rust
/// use lodedb::query::Query;
/// use lodedb::Database;
/// use serde_json::json;
///
/// let db = Database::open_in_memory().unwrap();
/// let users = db.collection("users").unwrap();
///
/// users.insert(json!({"name": "Alice", "age": 25})).unwrap();
/// users.insert(json!({"name": "Bob", "age": 30})).unwrap();
///
/// let found = users.find(&Query::new().gte("age", 30)).unwrap();
/// assert_eq!(found.len(), 1);
///
/// let stats = db.stats().unwrap();
/// assert_eq!(stats.total_documents(), 2);
/// db.close().unwrap();
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a builder for configuring and opening a database.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Opens, or creates, the database rooted at `path`.
    ///
    /// The `":memory:"` sentinel opens an in-memory database instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the root directory cannot be
    /// created.
    pub fn open(path: impl AsRef<Path>) -> LodeResult<Database> {
        DatabaseBuilder::new().path(path).open()
    }

    /// Opens a database that never touches the filesystem.
    pub fn open_in_memory() -> LodeResult<Database> {
        DatabaseBuilder::new().in_memory().open()
    }

    pub(crate) fn with_config(config: DatabaseConfig) -> LodeResult<Database> {
        if let Some(root) = config.db_path() {
            std::fs::create_dir_all(&root).map_err(|err| {
                log::error!("Failed to create database directory {:?}: {}", root, err);
                LodeError::new_with_cause(
                    &format!("Failed to create database directory {:?}", root),
                    ErrorKind::IOError,
                    err.into(),
                )
            })?;
        }

        let documents = DocumentStore::open(&config);
        let indexes = IndexStore::open(&config);
        let engine = QueryEngine::new(documents.clone(), indexes.clone());

        match config.db_path() {
            Some(root) => log::debug!("Opened database at {:?}", root),
            None => log::debug!("Opened in-memory database"),
        }

        let persistent = config.db_path().is_some();
        let db = Database {
            inner: Arc::new(DatabaseInner {
                config,
                documents,
                indexes,
                engine,
                write_locks: LockRegistry::new(),
                closed: AtomicBool::new(false),
            }),
        };
        if persistent {
            // index files lag the documents after an unclean shutdown
            db.rebuild_indexes()?;
        }
        Ok(db)
    }

    pub fn config(&self) -> DatabaseConfig {
        self.inner.config.clone()
    }

    /// Gets a collection by name, creating it if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is closed or the name is invalid
    /// (empty, starting with `.`, or containing a path separator).
    pub fn collection(&self, name: &str) -> LodeResult<Collection> {
        self.check_opened()?;
        validate_collection_name(name)?;
        self.inner.documents.ensure_collection(name);
        Ok(Collection::new(name, self.clone()))
    }

    /// Names of every collection, including empty ones.
    pub fn list_collection_names(&self) -> LodeResult<HashSet<String>> {
        self.check_opened()?;
        Ok(self.inner.documents.list_collection_names())
    }

    pub fn has_collection(&self, name: &str) -> LodeResult<bool> {
        self.check_opened()?;
        Ok(self.inner.documents.list_collection_names().contains(name))
    }

    /// Drops a collection with all its documents and indexes.
    ///
    /// Returns `false` if the collection did not exist. The collection's write
    /// lock outlives the drop, so a writer still holding it serializes with
    /// writers on a re-created collection of the same name.
    pub fn drop_collection(&self, name: &str) -> LodeResult<bool> {
        self.check_opened()?;
        validate_collection_name(name)?;
        let lock = self.inner.write_locks.get_lock(name);
        let _guard = lock.write();
        let dropped = self.inner.documents.drop_collection(name);
        self.inner.indexes.drop_collection_indexes(name);
        Ok(dropped)
    }

    /// Counts collections and documents and measures the on-disk size.
    pub fn stats(&self) -> LodeResult<DatabaseStats> {
        self.check_opened()?;
        let documents = &self.inner.documents;
        let names = documents.list_collection_names();
        let total = names.iter().map(|name| documents.count(name)).sum();
        Ok(DatabaseStats::new(names.len(), total, documents.disk_usage()))
    }

    /// Writes pending index changes to disk.
    ///
    /// Documents are written through on every call; index files are written
    /// here, by [Database::compact] and on close. No-op in in-memory mode.
    pub fn commit(&self) -> LodeResult<()> {
        self.check_opened()?;
        self.inner.indexes.flush();
        Ok(())
    }

    /// Rewrites every document file and flushes pending index changes. No-op
    /// in in-memory mode.
    pub fn compact(&self) -> LodeResult<()> {
        self.check_opened()?;
        self.inner.documents.compact();
        self.inner.indexes.flush();
        Ok(())
    }

    /// Rebuilds every index from the live documents.
    pub fn rebuild_indexes(&self) -> LodeResult<()> {
        self.check_opened()?;
        let documents = &self.inner.documents;
        let indexes = &self.inner.indexes;

        indexes.rebuild_all();
        for name in documents.list_collection_names() {
            let lock = self.inner.write_locks.get_lock(&name);
            let _guard = lock.write();
            if indexes.list_indexes(&name).is_empty() {
                continue;
            }
            for doc in documents.find_all(&name) {
                indexes.update_indexes_for_document(&name, &doc);
            }
        }
        log::debug!("Rebuilt all indexes");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Flushes everything to disk and releases all in-memory state.
    ///
    /// # Errors
    ///
    /// Returns `StoreAlreadyClosed` if the database was already closed.
    pub fn close(&self) -> LodeResult<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            log::error!("Database is already closed");
            return Err(LodeError::new(
                "Database is already closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        self.inner.shutdown();
        Ok(())
    }

    pub(crate) fn check_opened(&self) -> LodeResult<()> {
        if self.is_closed() {
            log::error!("Database is closed");
            return Err(LodeError::new(
                "Database is closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    pub(crate) fn write_lock(&self, collection: &str) -> LockHandle {
        self.inner.write_locks.get_lock(collection)
    }

    pub(crate) fn documents(&self) -> &DocumentStore {
        &self.inner.documents
    }

    pub(crate) fn indexes(&self) -> &IndexStore {
        &self.inner.indexes
    }

    pub(crate) fn engine(&self) -> &QueryEngine {
        &self.inner.engine
    }
}

struct DatabaseInner {
    config: DatabaseConfig,
    documents: DocumentStore,
    indexes: IndexStore,
    engine: QueryEngine,
    // serializes a collection's document write with its index maintenance
    write_locks: LockRegistry,
    closed: AtomicBool,
}

impl DatabaseInner {
    fn shutdown(&self) {
        self.documents.close();
        self.indexes.close();
        log::debug!("Database closed");
    }
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.shutdown();
        }
    }
}
