use crate::collection::Document;
use crate::common::{LockRegistry, COLLECTIONS_DIR, DOCUMENT_FILE_EXTENSION};
use crate::database_config::DatabaseConfig;
use crate::store::disk;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Authoritative mapping from (collection name, document id) to [Document].
///
/// # Purpose
/// `DocumentStore` keeps every collection's documents in memory and, unless
/// the database is in-memory, mirrors each document to its own file at
/// `<root>/collections/<collection>/<id>.json`.
///
/// # Characteristics
/// - **Thread-Safe**: every operation holds its collection's lock from the
///   shared [LockRegistry]; reads take shared access, writes exclusive access
/// - **Write-Through**: writes persist while holding the exclusive lock, so
///   file I/O is serialized with the in-memory swap
/// - **Best Effort**: a failed file write, delete or read is logged and the
///   in-memory effect still applies; nothing is returned to the caller
/// - **Cloneable**: clones share the same state through `Arc`
///
/// # Usage
/// ```rust
/// use lodedb::collection::Document;
/// use lodedb::store::DocumentStore;
/// use serde_json::json;
///
/// let store = DocumentStore::in_memory();
/// store.insert("users", Document::from_value("u1", &json!({"name": "Alice"})));
/// assert_eq!(store.count("users"), 1);
/// assert!(store.find_by_id("users", "u1").is_some());
/// assert!(store.delete("users", "u1"));
/// ```
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<DocumentStoreInner>,
}

impl DocumentStore {
    /// Opens a document store for `config`.
    ///
    /// In persistent mode every collection directory under
    /// `<root>/collections/` is loaded eagerly. Files that cannot be read or
    /// parsed are skipped with a warning.
    pub fn open(config: &DatabaseConfig) -> DocumentStore {
        let inner = DocumentStoreInner::new(config.db_path(), config.pretty_print());
        inner.load();
        DocumentStore {
            inner: Arc::new(inner),
        }
    }

    /// Creates a store that never touches the filesystem.
    pub fn in_memory() -> DocumentStore {
        DocumentStore {
            inner: Arc::new(DocumentStoreInner::new(None, false)),
        }
    }

    /// Returns `true` if this store persists nothing.
    pub fn is_in_memory(&self) -> bool {
        self.inner.root.is_none()
    }

    /// Registers `collection` so it is listed even before its first document.
    pub fn ensure_collection(&self, collection: &str) {
        self.inner.ensure_collection(collection)
    }

    /// Adds `doc` under its id, overwriting any document with the same id.
    pub fn insert(&self, collection: &str, doc: Document) {
        self.inner.insert(collection, doc)
    }

    /// Returns the current document with `id`, if any.
    pub fn find_by_id(&self, collection: &str, id: &str) -> Option<Document> {
        self.inner.find_by_id(collection, id)
    }

    /// Returns a snapshot of every document in `collection`, in no particular
    /// order.
    pub fn find_all(&self, collection: &str) -> Vec<Document> {
        self.inner.find_all(collection)
    }

    /// Replaces the document with `doc.id()`.
    ///
    /// Returns `false`, without side effects, when no such document exists.
    pub fn update(&self, collection: &str, doc: Document) -> bool {
        self.inner.update(collection, doc)
    }

    /// Removes the document with `id`; returns whether something was removed.
    pub fn delete(&self, collection: &str, id: &str) -> bool {
        self.inner.delete(collection, id)
    }

    /// Number of documents in `collection`; `0` for an unknown collection.
    pub fn count(&self, collection: &str) -> usize {
        self.inner.count(collection)
    }

    /// Removes every document of `collection` and, if persistent, its
    /// directory. Returns `false` if the collection was unknown.
    pub fn drop_collection(&self, collection: &str) -> bool {
        self.inner.drop_collection(collection)
    }

    pub fn list_collection_names(&self) -> HashSet<String> {
        self.inner.list_collection_names()
    }

    /// Rewrites every document's backing file. No-op in in-memory mode.
    pub fn compact(&self) {
        self.inner.compact()
    }

    /// Total size in bytes of all files under the database root.
    ///
    /// `0` in in-memory mode or if the directory walk fails.
    pub fn disk_usage(&self) -> u64 {
        self.inner.disk_usage()
    }

    /// Flushes every document to disk (if persistent) and clears all state.
    pub fn close(&self) {
        self.inner.close()
    }
}

struct DocumentStoreInner {
    root: Option<PathBuf>,
    pretty_print: bool,
    collections: DashMap<String, HashMap<String, Document>>,
    locks: LockRegistry,
}

impl DocumentStoreInner {
    fn new(root: Option<PathBuf>, pretty_print: bool) -> Self {
        DocumentStoreInner {
            root,
            pretty_print,
            collections: DashMap::new(),
            locks: LockRegistry::new(),
        }
    }

    fn collection_dir(&self, collection: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(COLLECTIONS_DIR).join(collection))
    }

    fn document_file(&self, collection: &str, id: &str) -> Option<PathBuf> {
        self.collection_dir(collection)
            .map(|dir| dir.join(format!("{}.{}", id, DOCUMENT_FILE_EXTENSION)))
    }

    fn load(&self) {
        let root = match &self.root {
            Some(root) => root.join(COLLECTIONS_DIR),
            None => return,
        };

        let dirs = match disk::list_dirs(&root) {
            Ok(dirs) => dirs,
            Err(err) => {
                log::warn!("Failed to list collections under {:?}: {}", root, err);
                return;
            }
        };

        for dir in dirs {
            let name = match disk::file_name(&dir) {
                Some(name) => name,
                None => {
                    log::warn!("Skipping collection directory with non UTF-8 name {:?}", dir);
                    continue;
                }
            };
            let documents = load_collection(&dir);
            log::debug!("Loaded {} documents into collection {}", documents.len(), name);
            self.collections.insert(name, documents);
        }
    }

    fn persist(&self, collection: &str, doc: &Document) {
        if let Some(path) = self.document_file(collection, doc.id()) {
            if let Err(err) = disk::write_json(&path, doc, self.pretty_print) {
                log::warn!(
                    "Failed to persist document {} of collection {}: {}",
                    doc.id(),
                    collection,
                    err
                );
            }
        }
    }

    fn ensure_collection(&self, collection: &str) {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        self.collections.entry(collection.to_string()).or_default();
        if let Some(dir) = self.collection_dir(collection) {
            if let Err(err) = std::fs::create_dir_all(&dir) {
                log::warn!("Failed to create directory {:?}: {}", dir, err);
            }
        }
    }

    fn insert(&self, collection: &str, doc: Document) {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        self.persist(collection, &doc);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id().to_string(), doc);
    }

    fn find_by_id(&self, collection: &str, id: &str) -> Option<Document> {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    fn find_all(&self, collection: &str) -> Vec<Document> {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn update(&self, collection: &str, doc: Document) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        let exists = self
            .collections
            .get(collection)
            .map(|docs| docs.contains_key(doc.id()))
            .unwrap_or(false);
        if !exists {
            return false;
        }

        self.persist(collection, &doc);
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.insert(doc.id().to_string(), doc);
        }
        true
    }

    fn delete(&self, collection: &str, id: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.write();

        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|mut docs| docs.remove(id))
            .is_some();

        if removed {
            if let Some(path) = self.document_file(collection, id) {
                if let Err(err) = disk::remove_file(&path) {
                    log::warn!(
                        "Failed to delete file of document {} in collection {}: {}",
                        id,
                        collection,
                        err
                    );
                }
            }
        }
        removed
    }

    fn count(&self, collection: &str) -> usize {
        let lock = self.locks.get_lock(collection);
        let _guard = lock.read();

        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn drop_collection(&self, collection: &str) -> bool {
        let lock = self.locks.get_lock(collection);
        let dropped = {
            let _guard = lock.write();

            let known = self.collections.remove(collection).is_some();
            let on_disk = match self.collection_dir(collection) {
                Some(dir) if dir.exists() => {
                    if let Err(err) = disk::remove_dir_all(&dir) {
                        log::warn!("Failed to remove directory {:?}: {}", dir, err);
                    }
                    true
                }
                _ => false,
            };
            known || on_disk
        };

        self.locks.remove_lock(collection);
        if dropped {
            log::debug!("Dropped collection {}", collection);
        }
        dropped
    }

    fn list_collection_names(&self) -> HashSet<String> {
        self.collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn compact(&self) {
        if self.root.is_none() {
            return;
        }

        for name in self.list_collection_names() {
            let lock = self.locks.get_lock(&name);
            let _guard = lock.write();

            if let Some(docs) = self.collections.get(&name) {
                for doc in docs.values() {
                    self.persist(&name, doc);
                }
            }
        }
        log::debug!("Compaction finished");
    }

    fn disk_usage(&self) -> u64 {
        match &self.root {
            Some(root) => disk::dir_size(root).unwrap_or_else(|err| {
                log::warn!("Failed to compute disk usage of {:?}: {}", root, err);
                0
            }),
            None => 0,
        }
    }

    fn close(&self) {
        for name in self.list_collection_names() {
            let lock = self.locks.get_lock(&name);
            let _guard = lock.write();

            if let Some((_, docs)) = self.collections.remove(&name) {
                for doc in docs.values() {
                    self.persist(&name, doc);
                }
            }
        }
        self.collections.clear();
        self.locks.clear();
        log::debug!("Document store closed");
    }
}

fn load_collection(dir: &Path) -> HashMap<String, Document> {
    let mut documents = HashMap::new();
    let files = match disk::list_files(dir, DOCUMENT_FILE_EXTENSION) {
        Ok(files) => files,
        Err(err) => {
            log::warn!("Failed to list documents in {:?}: {}", dir, err);
            return documents;
        }
    };

    for file in files {
        match disk::read_json::<Document>(&file) {
            Ok(doc) => {
                documents.insert(doc.id().to_string(), doc);
            }
            Err(err) => log::warn!("Skipping unreadable document file {:?}: {}", file, err),
        }
    }
    documents
}
