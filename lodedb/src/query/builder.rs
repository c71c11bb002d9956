use crate::common::{FieldPath, FieldValue, SortOrder};
use crate::query::{Condition, Operator};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// One key of a query's sort order.
#[derive(Clone, Debug, PartialEq)]
pub struct SortKey {
    field: FieldPath,
    order: SortOrder,
}

impl SortKey {
    pub fn new(field: &str, order: SortOrder) -> Self {
        SortKey {
            field: FieldPath::new(field),
            order,
        }
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Resolves this key's field in a parsed payload.
    pub fn resolve(&self, document: &serde_json::Value) -> FieldValue {
        self.field.resolve(document)
    }

    /// Compares two values already resolved for this key, honouring its
    /// direction.
    pub fn compare_resolved(&self, a: &FieldValue, b: &FieldValue) -> Ordering {
        self.order.apply(a.compare(b))
    }

    /// Compares two parsed payloads on this key, honouring its direction.
    pub fn compare(&self, a: &serde_json::Value, b: &serde_json::Value) -> Ordering {
        self.compare_resolved(&self.resolve(a), &self.resolve(b))
    }
}

/// A declarative query: AND-ed conditions, sort keys and
/// pagination.
///
/// Queries are built fluently and are plain values, so the same query can be
/// run any number of times.
///
/// # Examples
///
/// ```rust
/// use lodedb::query::Query;
///
/// let query = Query::new()
///     .gte("age", 25)
///     .lte("age", 35)
///     .contains("email", "@example.com")
///     .sort_desc("age")
///     .skip(1)
///     .limit(10);
///
/// assert_eq!(query.conditions().len(), 3);
/// assert_eq!(query.get_limit(), Some(10));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
    sort: Vec<SortKey>,
    skip: usize,
    limit: Option<usize>,
}

impl Query {
    /// Creates a query that matches every document.
    pub fn new() -> Self {
        Query::default()
    }

    /// Appends an arbitrary condition.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn with(self, field: &str, operator: Operator) -> Self {
        self.condition(Condition::new(field, operator))
    }

    pub fn eq(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Eq(value.into()))
    }

    pub fn ne(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Ne(value.into()))
    }

    pub fn gt(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Gt(value.into()))
    }

    pub fn gte(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Gte(value.into()))
    }

    pub fn lt(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Lt(value.into()))
    }

    pub fn lte(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Lte(value.into()))
    }

    /// Case-insensitive substring match.
    pub fn contains(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::Contains(value.into()))
    }

    /// Case-insensitive prefix match.
    pub fn starts_with(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::StartsWith(value.into()))
    }

    /// Case-insensitive suffix match.
    pub fn ends_with(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.with(field, Operator::EndsWith(value.into()))
    }

    /// Matches when the field equals any of `values`.
    pub fn in_values<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with(field, Operator::In(values))
    }

    /// Matches when the field equals none of `values`.
    pub fn not_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with(field, Operator::NotIn(values))
    }

    /// Matches when the presence of `field` equals `exists`.
    pub fn exists(self, field: &str, exists: bool) -> Self {
        self.with(field, Operator::Exists(exists))
    }

    pub fn sort_asc(mut self, field: &str) -> Self {
        self.sort.push(SortKey::new(field, SortOrder::Ascending));
        self
    }

    pub fn sort_desc(mut self, field: &str) -> Self {
        self.sort.push(SortKey::new(field, SortOrder::Descending));
        self
    }

    /// Drops the first `skip` results.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Returns at most `limit` results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn get_skip(&self) -> usize {
        self.skip
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if a parsed payload passes every condition.
    pub fn matches(&self, document: &serde_json::Value) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(document))
    }

    /// Resolves every sort key against a parsed payload, in key order.
    pub fn sort_values(&self, document: &serde_json::Value) -> Vec<FieldValue> {
        self.sort.iter().map(|key| key.resolve(document)).collect()
    }

    /// Compares two outputs of [Query::sort_values]; the first key that tells
    /// them apart wins.
    pub fn compare_values(&self, a: &[FieldValue], b: &[FieldValue]) -> Ordering {
        self.sort
            .iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(key, (left, right))| key.compare_resolved(left, right))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Compares two parsed payloads on the sort keys in order; the first key
    /// that tells them apart wins.
    pub fn compare(&self, a: &serde_json::Value, b: &serde_json::Value) -> Ordering {
        self.compare_values(&self.sort_values(a), &self.sort_values(b))
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.conditions.is_empty() {
            write!(f, "(all)")?;
        } else {
            write!(f, "{}", self.conditions.iter().join(" && "))?;
        }
        if !self.sort.is_empty() {
            let keys = self
                .sort
                .iter()
                .map(|key| match key.order {
                    SortOrder::Ascending => format!("{} asc", key.field),
                    SortOrder::Descending => format!("{} desc", key.field),
                })
                .join(", ");
            write!(f, " sort by {}", keys)?;
        }
        if self.skip > 0 {
            write!(f, " skip {}", self.skip)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}
