use crate::common::{fold_case, FieldPath, FieldValue};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// The comparison a [Condition] applies to its field, together with its operand.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    Eq(FieldValue),
    Ne(FieldValue),
    Gt(FieldValue),
    Gte(FieldValue),
    Lt(FieldValue),
    Lte(FieldValue),
    /// Case-insensitive substring match on textual forms.
    Contains(FieldValue),
    /// Case-insensitive prefix match on textual forms.
    StartsWith(FieldValue),
    /// Case-insensitive suffix match on textual forms.
    EndsWith(FieldValue),
    In(Vec<FieldValue>),
    NotIn(Vec<FieldValue>),
    /// Matches when the presence of the field equals the flag.
    Exists(bool),
}

/// A single predicate over one field of a document.
///
/// A condition pairs a [FieldPath] with an [Operator]. Conditions never fail:
/// a path that does not resolve yields [FieldValue::Null] and the operator
/// decides from there.
///
/// # Examples
///
/// ```rust
/// use lodedb::common::FieldValue;
/// use lodedb::query::{Condition, Operator};
/// use serde_json::json;
///
/// let adult = Condition::new("age", Operator::Gte(FieldValue::from(18)));
/// assert!(adult.matches(&json!({"age": 30})));
/// assert!(!adult.matches(&json!({"age": 12})));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    field: FieldPath,
    operator: Operator,
}

impl Condition {
    pub fn new(field: &str, operator: Operator) -> Self {
        Condition {
            field: FieldPath::new(field),
            operator,
        }
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The operand of an equality condition, if this is one.
    pub fn equality_operand(&self) -> Option<&FieldValue> {
        match &self.operator {
            Operator::Eq(value) => Some(value),
            _ => None,
        }
    }

    /// Evaluates this condition against a parsed document payload.
    pub fn matches(&self, document: &serde_json::Value) -> bool {
        let actual = self.field.resolve(document);
        match &self.operator {
            Operator::Eq(expected) => actual.equals(expected),
            Operator::Ne(expected) => !actual.equals(expected),
            Operator::Gt(bound) => actual.compare(bound) == Ordering::Greater,
            Operator::Gte(bound) => actual.compare(bound) != Ordering::Less,
            Operator::Lt(bound) => actual.compare(bound) == Ordering::Less,
            Operator::Lte(bound) => actual.compare(bound) != Ordering::Greater,
            Operator::Contains(pattern) => pattern_text(&actual).contains(&pattern_text(pattern)),
            Operator::StartsWith(pattern) => {
                pattern_text(&actual).starts_with(&pattern_text(pattern))
            }
            Operator::EndsWith(pattern) => pattern_text(&actual).ends_with(&pattern_text(pattern)),
            Operator::In(values) => values.iter().any(|value| actual.equals(value)),
            Operator::NotIn(values) => !values.iter().any(|value| actual.equals(value)),
            Operator::Exists(expected) => !actual.is_null() == *expected,
        }
    }
}

fn pattern_text(value: &FieldValue) -> String {
    fold_case(&value.to_pattern_text())
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let field = &self.field;
        match &self.operator {
            Operator::Eq(v) => write!(f, "({} == {})", field, v),
            Operator::Ne(v) => write!(f, "({} != {})", field, v),
            Operator::Gt(v) => write!(f, "({} > {})", field, v),
            Operator::Gte(v) => write!(f, "({} >= {})", field, v),
            Operator::Lt(v) => write!(f, "({} < {})", field, v),
            Operator::Lte(v) => write!(f, "({} <= {})", field, v),
            Operator::Contains(v) => write!(f, "({} contains {})", field, v),
            Operator::StartsWith(v) => write!(f, "({} starts with {})", field, v),
            Operator::EndsWith(v) => write!(f, "({} ends with {})", field, v),
            Operator::In(values) => write!(f, "({} in {})", field, list(values)),
            Operator::NotIn(values) => write!(f, "({} not in {})", field, list(values)),
            Operator::Exists(flag) => write!(f, "({} exists {})", field, flag),
        }
    }
}

fn list(values: &[FieldValue]) -> String {
    format!("[{}]", values.iter().join(", "))
}
