use crate::collection::Document;
use crate::common::{validate_field_name, validate_id};
use crate::database::Database;
use crate::errors::{ErrorKind, LodeError, LodeResult};
use crate::query::{Query, QueryPlan};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

/// A handle to a named collection of documents.
///
/// A `Collection` is created with [Database::collection] and carries no
/// state beyond its name and the database it belongs to; handles are cheap to
/// clone and any number of them may point at the same collection.
///
/// Every write goes to the document store and is then mirrored into the
/// collection's indexes while holding the collection's write lock, so index
/// buckets always describe the current documents:
/// - an insert or update first removes the id from every index, then adds
///   the new values
/// - a delete removes the id from every index
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
/// users.create_index("email").unwrap();
///
/// let id = users.insert(json!({"email": "jane@example.com", "age": 25})).unwrap();
/// let jane = users.find_one(&Query::new().eq("email", "jane@example.com")).unwrap();
/// assert_eq!(jane.unwrap().id(), id);
///
/// assert!(users.update_by_id(&id, json!({"email": "jane@example.com", "age": 26})).unwrap());
/// assert_eq!(users.count_matching(&Query::new().eq("age", 26)).unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct Collection {
    name: String,
    db: Database,
}

impl Collection {
    pub(crate) fn new(name: &str, db: Database) -> Self {
        Collection {
            name: name.to_string(),
            db,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts `value` under a freshly generated UUID-v4 id and returns the id.
    pub fn insert(&self, value: serde_json::Value) -> LodeResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert_with_id(&id, value)?;
        Ok(id)
    }

    /// Inserts `value` under `id`, replacing any document with the same id.
    pub fn insert_with_id(&self, id: &str, value: serde_json::Value) -> LodeResult<()> {
        self.db.check_opened()?;
        validate_id(id)?;
        self.write(Document::from_value(id, &value));
        Ok(())
    }

    /// Inserts every value under a fresh id; returns the ids in input order.
    pub fn insert_many<I>(&self, values: I) -> LodeResult<Vec<String>>
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        values.into_iter().map(|value| self.insert(value)).collect()
    }

    /// Serializes `object` and inserts it under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `ObjectMappingError` if `object` cannot be serialized.
    pub fn insert_object<T: Serialize>(&self, object: &T) -> LodeResult<String> {
        self.db.check_opened()?;
        let id = uuid::Uuid::new_v4().to_string();
        let doc = Document::from_object(&id, object)?;
        self.write(doc);
        Ok(id)
    }

    pub fn find_by_id(&self, id: &str) -> LodeResult<Option<Document>> {
        self.db.check_opened()?;
        Ok(self.db.documents().find_by_id(&self.name, id))
    }

    /// Returns every document matching `query`, sorted and paginated as it
    /// asks.
    pub fn find(&self, query: &Query) -> LodeResult<Vec<Document>> {
        self.db.check_opened()?;
        Ok(self.db.engine().find(&self.name, query))
    }

    /// Returns the first document `find` would return, if any.
    pub fn find_one(&self, query: &Query) -> LodeResult<Option<Document>> {
        Ok(self.find(query)?.into_iter().next())
    }

    /// Returns every document, in no particular order.
    pub fn find_all(&self) -> LodeResult<Vec<Document>> {
        self.db.check_opened()?;
        Ok(self.db.documents().find_all(&self.name))
    }

    pub fn count(&self) -> LodeResult<usize> {
        self.db.check_opened()?;
        Ok(self.db.documents().count(&self.name))
    }

    /// Number of documents matching `query`, after its skip and limit.
    pub fn count_matching(&self, query: &Query) -> LodeResult<usize> {
        Ok(self.find(query)?.len())
    }

    /// Replaces the payload of the document with `id`.
    ///
    /// Returns `false` if there is no such document.
    pub fn update_by_id(&self, id: &str, value: serde_json::Value) -> LodeResult<bool> {
        self.db.check_opened()?;
        validate_id(id)?;

        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        let doc = Document::from_value(id, &value);
        if !self.db.documents().update(&self.name, doc.clone()) {
            return Ok(false);
        }
        self.reindex(&doc);
        Ok(true)
    }

    /// Sets the top-level fields of `changes` on every document matching
    /// `query`, keeping their other fields. Returns the number of documents
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `changes` is not a JSON object.
    pub fn update_many(&self, query: &Query, changes: serde_json::Value) -> LodeResult<usize> {
        self.db.check_opened()?;
        let changes = match changes {
            serde_json::Value::Object(changes) => changes,
            other => {
                log::error!("Update must be a JSON object, got {}", other);
                return Err(LodeError::new(
                    "Update must be a JSON object",
                    ErrorKind::InvalidOperation,
                ));
            }
        };

        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        let mut updated = 0;
        for doc in self.db.engine().find(&self.name, query) {
            let mut fields = match doc.value() {
                Ok(serde_json::Value::Object(fields)) => fields,
                _ => {
                    log::warn!("Document {} is not an object, skipping update", doc.id());
                    continue;
                }
            };
            for (key, value) in changes.iter() {
                fields.insert(key.clone(), value.clone());
            }

            let doc = Document::from_value(doc.id(), &serde_json::Value::Object(fields));
            if self.db.documents().update(&self.name, doc.clone()) {
                self.reindex(&doc);
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Deletes the document with `id`; returns whether it existed.
    pub fn delete_by_id(&self, id: &str) -> LodeResult<bool> {
        self.db.check_opened()?;

        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        let deleted = self.db.documents().delete(&self.name, id);
        if deleted {
            self.db.indexes().remove_document_from_indexes(&self.name, id);
        }
        Ok(deleted)
    }

    /// Deletes every document matching `query`; returns how many were deleted.
    pub fn delete_many(&self, query: &Query) -> LodeResult<usize> {
        self.db.check_opened()?;

        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        let mut deleted = 0;
        for doc in self.db.engine().find(&self.name, query) {
            if self.db.documents().delete(&self.name, doc.id()) {
                self.db
                    .indexes()
                    .remove_document_from_indexes(&self.name, doc.id());
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Creates an index on `field` and fills it from the existing documents.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFieldName` for a malformed field path and
    /// `IndexAlreadyExists` if the field is already indexed.
    pub fn create_index(&self, field: &str) -> LodeResult<()> {
        self.db.check_opened()?;
        validate_field_name(field)?;

        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        let indexes = self.db.indexes();
        if !indexes.create_index(&self.name, field) {
            log::error!("Index on {}.{} already exists", self.name, field);
            return Err(LodeError::new(
                &format!("Index on {} already exists", field),
                ErrorKind::IndexAlreadyExists,
            ));
        }
        for doc in self.db.documents().find_all(&self.name) {
            indexes.update_indexes_for_document(&self.name, &doc);
        }
        Ok(())
    }

    /// Drops the index on `field`.
    ///
    /// # Errors
    ///
    /// Returns `IndexNotFound` if the field is not indexed.
    pub fn drop_index(&self, field: &str) -> LodeResult<()> {
        self.db.check_opened()?;

        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        if !self.db.indexes().drop_index(&self.name, field) {
            log::error!("No index on {}.{}", self.name, field);
            return Err(LodeError::new(
                &format!("No index on {}", field),
                ErrorKind::IndexNotFound,
            ));
        }
        Ok(())
    }

    pub fn has_index(&self, field: &str) -> LodeResult<bool> {
        self.db.check_opened()?;
        Ok(self.db.indexes().has_index(&self.name, field))
    }

    /// Names of the indexed fields.
    pub fn list_indexes(&self) -> LodeResult<HashSet<String>> {
        self.db.check_opened()?;
        Ok(self.db.indexes().list_indexes(&self.name))
    }

    /// Describes how `find` would gather candidates for `query`.
    pub fn explain(&self, query: &Query) -> LodeResult<QueryPlan> {
        self.db.check_opened()?;
        Ok(self.db.engine().explain(&self.name, query))
    }

    fn write(&self, doc: Document) {
        let lock = self.db.write_lock(&self.name);
        let _guard = lock.write();

        let replaced = self.db.documents().find_by_id(&self.name, doc.id()).is_some();
        self.db.documents().insert(&self.name, doc.clone());
        if replaced {
            self.reindex(&doc);
        } else {
            self.db.indexes().update_indexes_for_document(&self.name, &doc);
        }
    }

    // Caller holds the write lock.
    fn reindex(&self, doc: &Document) {
        let indexes = self.db.indexes();
        indexes.remove_document_from_indexes(&self.name, doc.id());
        indexes.update_indexes_for_document(&self.name, doc);
    }
}

impl Debug for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Collection({})", self.name)
    }
}
