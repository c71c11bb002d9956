use std::fmt::{Display, Formatter};

/// How the query engine would gather candidates for a query.
///
/// Returned by [QueryEngine::explain](crate::query::QueryEngine::explain).
/// `index_field` names the indexed field used to narrow the candidate set, or
/// is `None` for a full collection scan. `candidates` is the number of
/// documents that would be tested against the conditions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryPlan {
    index_field: Option<String>,
    candidates: usize,
}

impl QueryPlan {
    pub(crate) fn index_scan(field: &str, candidates: usize) -> Self {
        QueryPlan {
            index_field: Some(field.to_string()),
            candidates,
        }
    }

    pub(crate) fn collection_scan(candidates: usize) -> Self {
        QueryPlan {
            index_field: None,
            candidates,
        }
    }

    pub fn index_field(&self) -> Option<&str> {
        self.index_field.as_deref()
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn uses_index(&self) -> bool {
        self.index_field.is_some()
    }
}

impl Display for QueryPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.index_field {
            Some(field) => write!(f, "index scan on {} ({} candidates)", field, self.candidates),
            None => write!(f, "collection scan ({} candidates)", self.candidates),
        }
    }
}
