use crate::collection::Document;
use crate::common::{FieldPath, FieldValue, LockRegistry, INDEXES_DIR, INDEX_FILE_EXTENSION};
use crate::database_config::DatabaseConfig;
use crate::index::FieldIndex;
use crate::store;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-collection, per-field hash indexes and their persistence.
///
/// The index store never observes writes on its own. The caller keeps it in
/// step with the [DocumentStore](crate::store::DocumentStore) by calling
/// [IndexStore::update_indexes_for_document] after every successful write and
/// [IndexStore::remove_document_from_indexes] after every delete. On an update
/// the caller removes the id first and then re-adds the new document, so a
/// stale value never lingers in a bucket.
///
/// Each collection's indexes are guarded by a lock from the store's own
/// [LockRegistry]: lookups take shared access, mutations exclusive access.
///
/// When persistent, every index lives in `<root>/indexes/<collection>/<field>.idx`.
/// A new or rebuilt index is written at once; entry changes only mark it
/// dirty, and dirty indexes are written by [IndexStore::flush] and
/// [IndexStore::close]. Write failures are logged, never returned. All index
/// files are loaded eagerly when the store opens.
///
/// # Examples
///
/// ```rust
/// use lodedb::collection::Document;
/// use lodedb::common::FieldValue;
/// use lodedb::index::IndexStore;
/// use serde_json::json;
///
/// let indexes = IndexStore::in_memory();
/// assert!(indexes.create_index("users", "age"));
///
/// let bob = Document::from_value("bob", &json!({"age": 30}));
/// indexes.update_indexes_for_document("users", &bob);
/// assert!(indexes.lookup("users", "age", &FieldValue::from(30)).contains("bob"));
/// ```
#[derive(Clone)]
pub struct IndexStore {
    inner: Arc<IndexStoreInner>,
}

impl IndexStore {
    /// Opens an index store for `config`, loading any persisted indexes.
    pub fn open(config: &DatabaseConfig) -> IndexStore {
        let inner = IndexStoreInner::new(config.db_path(), config.pretty_print());
        inner.load();
        IndexStore {
            inner: Arc::new(inner),
        }
    }

    pub fn in_memory() -> IndexStore {
        IndexStore {
            inner: Arc::new(IndexStoreInner::new(None, false)),
        }
    }

    /// Creates an empty index on `field`.
    ///
    /// Returns `false` if `collection` already has an index on `field`.
    pub fn create_index(&self, collection: &str, field: &str) -> bool {
        self.inner.create_index(collection, field)
    }

    /// Drops the index on `field` together with its file.
    pub fn drop_index(&self, collection: &str, field: &str) -> bool {
        self.inner.drop_index(collection, field)
    }

    pub fn has_index(&self, collection: &str, field: &str) -> bool {
        self.inner.has_index(collection, field)
    }

    /// Names of every indexed field of `collection`.
    pub fn list_indexes(&self, collection: &str) -> HashSet<String> {
        self.inner.list_indexes(collection)
    }

    /// Adds `doc` to every index of `collection` whose field resolves to an
    /// indexable value in `doc`.
    ///
    /// Absent, `null`, array and object values are not indexed. Nothing is
    /// removed here.
    pub fn update_indexes_for_document(&self, collection: &str, doc: &Document) {
        self.inner.update_indexes_for_document(collection, doc)
    }

    /// Removes `id` from every bucket of every index of `collection`.
    pub fn remove_document_from_indexes(&self, collection: &str, id: &str) {
        self.inner.remove_document_from_indexes(collection, id)
    }

    /// Exact-match lookup of `value` in the index on `field`.
    ///
    /// Empty when there is no such index, no matching bucket, or `value` has
    /// no index key.
    pub fn lookup(&self, collection: &str, field: &str, value: &FieldValue) -> HashSet<String> {
        self.inner.lookup(collection, field, value)
    }

    /// Returns `true` if any bucket of any index of `collection` holds `id`.
    pub fn contains_document(&self, collection: &str, id: &str) -> bool {
        self.inner.contains_document(collection, id)
    }

    /// Removes every index of `collection` and their files.
    pub fn drop_collection_indexes(&self, collection: &str) {
        self.inner.drop_collection_indexes(collection)
    }

    /// Empties every index, keeping the index definitions.
    ///
    /// Repopulating is up to the caller, by feeding every live document back
    /// through [IndexStore::update_indexes_for_document].
    pub fn rebuild_all(&self) {
        self.inner.rebuild_all()
    }

    /// Writes every index changed since the last flush.
    pub fn flush(&self) {
        self.inner.flush()
    }

    /// Returns `true` if some index of `collection` has unwritten changes.
    pub fn is_dirty(&self, collection: &str) -> bool {
        self.inner.is_dirty(collection)
    }

    /// Persists every index and clears in-memory state.
    pub fn close(&self) {
        self.inner.close()
    }
}

struct IndexStoreInner {
    root: Option<PathBuf>,
    pretty_print: bool,
    indexes: DashMap<String, HashMap<String, FieldIndex>>,
    dirty: DashMap<String, HashSet<String>>,
    locks: LockRegistry,
}

impl IndexStoreInner {
    fn new(root: Option<PathBuf>, pretty_print: bool) -> Self {
        IndexStoreInner {
            root,
            pretty_print,
            indexes: DashMap::new(),
            dirty: DashMap::new(),
            locks: LockRegistry::new(),
        }
    }

    fn collection_dir(&self, collection: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(INDEXES_DIR).join(collection))
    }

    fn index_file(&self, collection: &str, field: &str) -> Option<PathBuf> {
        self.collection_dir(collection)
            .map(|dir| dir.join(format!("{}.{}", field, INDEX_FILE_EXTENSION)))
    }

    fn load(&self) {
        let root = match &self.root {
            Some(root) => root.join(INDEXES_DIR),
            None => return,
        };

        let dirs = match store::list_dirs(&root) {
            Ok(dirs) => dirs,
            Err(err) => {
                log::warn!("Failed to list indexes under {:?}: {}", root, err);
                return;
            }
        };

        for dir in dirs {
            if let Some(name) = store::file_name(&dir) {
                let indexes = load_indexes(&dir);
                log::debug!("Loaded {} indexes for collection {}", indexes.len(), name);
                self.indexes.insert(name, indexes);
            }
        }
    }

    fn persist(&self, collection: &str, index: &FieldIndex) {
        if let Some(path) = self.index_file(collection, index.field_name()) {
            if let Err(err) = store::write_json(&path, index, self.pretty_print) {
                log::warn!(
                    "Failed to persist index {} of collection {}: {}",
                    index.field_name(),
                    collection,
                    err
                );
            }
        }
    }

    // Caller holds the collection's write lock.
    fn mark_dirty(&self, collection: &str, field: &str) {
        if self.root.is_some() {
            self.dirty
                .entry(collection.to_string())
                .or_default()
                .insert(field.to_string());
        }
    }

    fn create_index(&self, collection: &str, field: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        let mut indexes = self.indexes.entry(collection.to_string()).or_default();
        if indexes.contains_key(field) {
            return false;
        }

        let index = FieldIndex::new(field);
        self.persist(collection, &index);
        indexes.insert(field.to_string(), index);
        log::debug!("Created index on {}.{}", collection, field);
        true
    }

    fn drop_index(&self, collection: &str, field: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        let removed = self
            .indexes
            .get_mut(collection)
            .and_then(|mut indexes| indexes.remove(field))
            .is_some();

        if let Some(mut fields) = self.dirty.get_mut(collection) {
            fields.remove(field);
        }

        if removed {
            if let Some(path) = self.index_file(collection, field) {
                if let Err(err) = store::remove_file(&path) {
                    log::warn!("Failed to delete index file {:?}: {}", path, err);
                }
            }
            log::debug!("Dropped index on {}.{}", collection, field);
        }
        removed
    }

    fn has_index(&self, collection: &str, field: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.indexes
            .get(collection)
            .map(|indexes| indexes.contains_key(field))
            .unwrap_or(false)
    }

    fn list_indexes(&self, collection: &str) -> HashSet<String> {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.indexes
            .get(collection)
            .map(|indexes| indexes.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn update_indexes_for_document(&self, collection: &str, doc: &Document) {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        let mut indexes = match self.indexes.get_mut(collection) {
            Some(indexes) if !indexes.is_empty() => indexes,
            _ => return,
        };

        let value = match doc.value() {
            Ok(value) => value,
            Err(err) => {
                log::warn!(
                    "Document {} of collection {} is not indexable: {}",
                    doc.id(),
                    collection,
                    err
                );
                return;
            }
        };

        for (field, index) in indexes.iter_mut() {
            let key = match FieldPath::new(field).resolve(&value).index_key() {
                Some(key) => key,
                None => continue,
            };
            if index.add(&key, doc.id()) {
                self.mark_dirty(collection, field);
            }
        }
    }

    fn remove_document_from_indexes(&self, collection: &str, id: &str) {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        if let Some(mut indexes) = self.indexes.get_mut(collection) {
            for (field, index) in indexes.iter_mut() {
                if index.remove_id(id) {
                    self.mark_dirty(collection, field);
                }
            }
        }
    }

    fn lookup(&self, collection: &str, field: &str, value: &FieldValue) -> HashSet<String> {
        let key = match value.index_key() {
            Some(key) => key,
            None => return HashSet::new(),
        };

        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.indexes
            .get(collection)
            .and_then(|indexes| indexes.get(field).map(|index| index.lookup(&key)))
            .unwrap_or_default()
    }

    fn contains_document(&self, collection: &str, id: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.indexes
            .get(collection)
            .map(|indexes| indexes.values().any(|index| index.contains_id(id)))
            .unwrap_or(false)
    }

    fn drop_collection_indexes(&self, collection: &str) {
        let lock = self.locks.get_lock(collection);
        {
            let _guard = lock.write();

            self.indexes.remove(collection);
            self.dirty.remove(collection);
            if let Some(dir) = self.collection_dir(collection) {
                if let Err(err) = store::remove_dir_all(&dir) {
                    log::warn!("Failed to remove index directory {:?}: {}", dir, err);
                }
            }
        }
        self.locks.remove_lock(collection);
    }

    fn collection_names(&self) -> Vec<String> {
        self.indexes.iter().map(|entry| entry.key().clone()).collect()
    }

    fn rebuild_all(&self) {
        for name in self.collection_names() {
            let lock = self.locks.get_lock(&name);
            let _guard = lock.write();

            if let Some(mut indexes) = self.indexes.get_mut(&name) {
                for index in indexes.values_mut() {
                    index.clear();
                    self.persist(&name, index);
                }
                if let Some(mut fields) = self.dirty.get_mut(&name) {
                    fields.clear();
                }
            }
        }
        log::debug!("Cleared all indexes for rebuild");
    }

    fn flush(&self) {
        let names: Vec<String> = self.dirty.iter().map(|entry| entry.key().clone()).collect();
        let mut written = 0;
        for name in names {
            let lock = self.locks.get_lock(&name);
            let _guard = lock.write();

            let fields = match self.dirty.remove(&name) {
                Some((_, fields)) => fields,
                None => continue,
            };
            if let Some(indexes) = self.indexes.get(&name) {
                for field in fields {
                    if let Some(index) = indexes.get(&field) {
                        self.persist(&name, index);
                        written += 1;
                    }
                }
            }
        }
        if written > 0 {
            log::debug!("Flushed {} dirty indexes", written);
        }
    }

    fn is_dirty(&self, collection: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.dirty
            .get(collection)
            .map(|fields| !fields.is_empty())
            .unwrap_or(false)
    }

    fn close(&self) {
        for name in self.collection_names() {
            let lock = self.locks.get_lock(&name);
            let _guard = lock.write();

            if let Some((_, indexes)) = self.indexes.remove(&name) {
                for index in indexes.values() {
                    self.persist(&name, index);
                }
            }
        }
        self.indexes.clear();
        self.dirty.clear();
        self.locks.clear();
        log::debug!("Index store closed");
    }
}

fn load_indexes(dir: &Path) -> HashMap<String, FieldIndex> {
    let mut indexes = HashMap::new();
    let files = match store::list_files(dir, INDEX_FILE_EXTENSION) {
        Ok(files) => files,
        Err(err) => {
            log::warn!("Failed to list index files in {:?}: {}", dir, err);
            return indexes;
        }
    };

    for file in files {
        match store::read_json::<FieldIndex>(&file) {
            Ok(index) => {
                indexes.insert(index.field_name().to_string(), index);
            }
            Err(err) => log::warn!("Skipping unreadable index file {:?}: {}", file, err),
        }
    }
    indexes
}
