use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A scalar view of a document field, used for comparison, sorting and
/// index keys.
///
/// # Variants
/// - `Null`: JSON `null`, or a field that does not resolve
/// - `Bool`: JSON boolean
/// - `Number`: any JSON number, promoted to `f64`
/// - `Text`: JSON string
/// - `Other`: a JSON array or object, carried as its JSON text
///
/// # Comparison
/// [FieldValue::compare] orders values as follows:
/// - `Null` equals `Null` and sorts before every other value
/// - two numbers compare numerically
/// - two booleans compare with `false < true`
/// - every other pairing, including number against text, compares the
///   textual forms case-insensitively
///
/// # Examples
///
/// ```rust
/// use lodedb::common::FieldValue;
/// use std::cmp::Ordering;
///
/// assert_eq!(FieldValue::from(30).compare(&FieldValue::from(30.0)), Ordering::Equal);
/// assert_eq!(FieldValue::from("Alice").compare(&FieldValue::from("alice")), Ordering::Equal);
/// assert_eq!(FieldValue::Null.compare(&FieldValue::from(false)), Ordering::Less);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Other(String),
}

impl FieldValue {
    /// Builds a field value from a JSON tree node.
    pub fn from_json(value: &serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => FieldValue::Other(n.to_string()),
            },
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                FieldValue::Other(value.to_string())
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the canonical textual form of this value.
    ///
    /// Numbers with no fractional part print without one (`30`, not `30.0`)
    /// and negative zero prints as `0`, so numerically equal values always
    /// share a textual form.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Other(s) => s.clone(),
        }
    }

    /// Textual form used by the substring operators: empty for `Null`.
    pub fn to_pattern_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            other => other.to_text(),
        }
    }

    /// Returns the hash-index bucket key for this value.
    ///
    /// `Null` and `Other` values are never indexed. The key is the case-folded
    /// textual form, which makes two values share a bucket exactly when
    /// [FieldValue::equals] holds between them.
    pub fn index_key(&self) -> Option<String> {
        match self {
            FieldValue::Null | FieldValue::Other(_) => None,
            other => Some(fold_case(&other.to_text())),
        }
    }

    /// Compares two values using the ordering rules of the query engine.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            (FieldValue::Number(a), FieldValue::Number(b)) => match a.partial_cmp(b) {
                Some(ordering) => ordering,
                // NaN has no numeric order
                None => compare_text(self, other),
            },
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (a, b) => compare_text(a, b),
        }
    }

    /// Equality as used by `eq`, `ne`, `in` and `not in`, where `self` is the
    /// resolved field value.
    ///
    /// Arrays and objects count as absent for equality, so they only ever
    /// match a `Null` operand.
    pub fn equals(&self, operand: &FieldValue) -> bool {
        let field = match self {
            FieldValue::Other(_) => &FieldValue::Null,
            value => value,
        };
        field.compare(operand) == Ordering::Equal
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Lower-cases every character independently of its neighbours.
///
/// Used for both sorting and index keys so the two never disagree on
/// context-sensitive mappings.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn compare_text(a: &FieldValue, b: &FieldValue) -> Ordering {
    fold_case(&a.to_text()).cmp(&fold_case(&b.to_text()))
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // covers -0.0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::Number(value as f64)
                }
            }
        )*
    };
}

number_from!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize, f32, f64);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::from_json(&value)
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        FieldValue::from_json(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}
