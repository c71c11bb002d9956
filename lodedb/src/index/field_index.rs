use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A hash index over one field of one collection.
///
/// Maps the index key of a field value (see
/// [FieldValue::index_key](crate::common::FieldValue::index_key)) to the set of
/// document ids holding that value. A bucket never stays empty: removing the
/// last id of a bucket prunes the bucket.
///
/// The serialized form is also the on-disk layout of an index file:
/// `{"fieldName": "...", "entries": {"<key>": ["id1", "id2"]}}`.
///
/// # Examples
///
/// ```rust
/// use lodedb::index::FieldIndex;
///
/// let mut index = FieldIndex::new("age");
/// index.add("30", "bob");
/// assert!(index.lookup("30").contains("bob"));
///
/// index.remove_id("bob");
/// assert!(index.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIndex {
    field_name: String,
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl FieldIndex {
    pub fn new(field_name: &str) -> Self {
        FieldIndex {
            field_name: field_name.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Adds `id` to the bucket for `key`. Returns `false` if it was already there.
    pub fn add(&mut self, key: &str, id: &str) -> bool {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(id.to_string())
    }

    /// Removes `id` from every bucket, pruning buckets left empty.
    ///
    /// Returns `true` if at least one bucket held `id`.
    pub fn remove_id(&mut self, id: &str) -> bool {
        let mut removed = false;
        self.entries.retain(|_, ids| {
            removed |= ids.remove(id);
            !ids.is_empty()
        });
        removed
    }

    /// Ids in the bucket for `key`; empty if there is no such bucket.
    pub fn lookup(&self, key: &str) -> HashSet<String> {
        self.entries
            .get(key)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.values().any(|ids| ids.contains(id))
    }

    /// Drops every bucket.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of distinct keys.
    pub fn bucket_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
