use crate::collection::Document;
use crate::common::FieldValue;
use crate::index::IndexStore;
use crate::query::{Condition, Query, QueryPlan};
use crate::store::DocumentStore;
use std::cmp::Ordering;

/// Evaluates [Query] values against a collection.
///
/// # Algorithm
/// 1. **Candidates**: the first equality condition whose field is indexed and
///    whose operand has an index key narrows the candidates to the matching
///    index bucket. Without one, every document of the collection is a
///    candidate.
/// 2. **Filter**: each candidate is tested against every condition, the
///    narrowing one included. A payload that does not parse never matches.
/// 3. **Sort**: a stable sort on the query's sort keys, if any. Each
///    document's keys are resolved once up front. Mixed-type keys need not
///    form a total order, so the sort only relies on pairwise comparisons.
/// 4. **Paginate**: `skip`, then `limit`.
///
/// The result is always a materialized `Vec`.
///
/// # Examples
///
/// ```rust
/// use lodedb::collection::Document;
/// use lodedb::index::IndexStore;
/// use lodedb::query::{Query, QueryEngine};
/// use lodedb::store::DocumentStore;
/// use serde_json::json;
///
/// let documents = DocumentStore::in_memory();
/// let engine = QueryEngine::new(documents.clone(), IndexStore::in_memory());
///
/// documents.insert("users", Document::from_value("a", &json!({"age": 25})));
/// documents.insert("users", Document::from_value("b", &json!({"age": 30})));
///
/// let found = engine.find("users", &Query::new().lt("age", 30));
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].id(), "a");
/// ```
#[derive(Clone)]
pub struct QueryEngine {
    documents: DocumentStore,
    indexes: IndexStore,
}

impl QueryEngine {
    pub fn new(documents: DocumentStore, indexes: IndexStore) -> Self {
        QueryEngine { documents, indexes }
    }

    /// Runs `query` against `collection`, narrowing through an index when one
    /// applies.
    pub fn find(&self, collection: &str, query: &Query) -> Vec<Document> {
        let candidates = match self.index_condition(collection, query) {
            Some(condition) => self.index_candidates(collection, condition),
            None => self.documents.find_all(collection),
        };
        execute(candidates, query)
    }

    /// Runs `query` against `collection` with a full scan, ignoring indexes.
    ///
    /// Always returns the same documents as [QueryEngine::find].
    pub fn find_without_index(&self, collection: &str, query: &Query) -> Vec<Document> {
        execute(self.documents.find_all(collection), query)
    }

    /// Describes how [QueryEngine::find] would gather candidates for `query`.
    pub fn explain(&self, collection: &str, query: &Query) -> QueryPlan {
        match self.index_condition(collection, query) {
            Some(condition) => {
                let field = condition.field().as_str();
                let candidates = self.index_ids(collection, condition).len();
                QueryPlan::index_scan(field, candidates)
            }
            None => QueryPlan::collection_scan(self.documents.count(collection)),
        }
    }

    fn index_condition<'a>(&self, collection: &str, query: &'a Query) -> Option<&'a Condition> {
        query.conditions().iter().find(|condition| {
            condition
                .equality_operand()
                .map(|operand| {
                    operand.index_key().is_some()
                        && self.indexes.has_index(collection, condition.field().as_str())
                })
                .unwrap_or(false)
        })
    }

    fn index_ids(&self, collection: &str, condition: &Condition) -> Vec<String> {
        match condition.equality_operand() {
            Some(operand) => self
                .indexes
                .lookup(collection, condition.field().as_str(), operand)
                .into_iter()
                .collect(),
            None => Vec::new(),
        }
    }

    fn index_candidates(&self, collection: &str, condition: &Condition) -> Vec<Document> {
        let ids = self.index_ids(collection, condition);
        log::debug!(
            "Using index on {}.{} with {} candidates",
            collection,
            condition.field(),
            ids.len()
        );
        ids.iter()
            .filter_map(|id| self.documents.find_by_id(collection, id))
            .collect()
    }
}

fn execute(candidates: Vec<Document>, query: &Query) -> Vec<Document> {
    let matched: Vec<(Document, Vec<FieldValue>)> = candidates
        .into_iter()
        .filter_map(|doc| match doc.value() {
            Ok(value) => Some((doc, value)),
            Err(err) => {
                log::warn!("Skipping document {} with unreadable payload: {}", doc.id(), err);
                None
            }
        })
        .filter(|(_, value)| query.matches(value))
        .map(|(doc, value)| {
            let keys = query.sort_values(&value);
            (doc, keys)
        })
        .collect();

    let matched = if query.sort_keys().is_empty() {
        matched
    } else {
        stable_sort(matched, |a, b| query.compare_values(&a.1, &b.1))
    };

    let iter = matched.into_iter().skip(query.get_skip()).map(|(doc, _)| doc);
    match query.get_limit() {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

/// Stable top-down merge sort. Terminates with a permutation of `items` for
/// any comparator, total order or not.
fn stable_sort<T>(items: Vec<T>, compare: impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    merge_sort(items, &compare)
}

fn merge_sort<T>(mut items: Vec<T>, compare: &dyn Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        // ties keep the left element first
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}
