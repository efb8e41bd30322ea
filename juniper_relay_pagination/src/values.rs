use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors raised when comparing cursor values against record values.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The two values are of different kinds, e.g. a string cursor value compared with an integer
    /// column. Usually means the cursor was minted for a different ordering.
    #[error("cannot compare {left} value with {right} value")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// The record does not expose the column the predicate refers to.
    #[error("record has no column named `{0}`")]
    MissingColumn(String),
}

/// A value carried inside a cursor, either the identifier of a record or the value of one of the
/// fields the connection is ordered by.
///
/// Values only compare with values of the same kind. Comparing across kinds is an error rather than
/// an arbitrary order so that a cursor minted under the wrong ordering fails loudly.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CursorValue {
    Int(i64),
    Bool(bool),
    String(String),
    Time(DateTime<Utc>),
    Uuid(Uuid),
    /// Ordered tuple of values, used when ordering by more than one field.
    List(Vec<CursorValue>),
}

impl CursorValue {
    /// Name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CursorValue::Int(_) => "int",
            CursorValue::Bool(_) => "bool",
            CursorValue::String(_) => "string",
            CursorValue::Time(_) => "time",
            CursorValue::Uuid(_) => "uuid",
            CursorValue::List(_) => "list",
        }
    }

    /// Compares two values of the same kind. Lists compare lexicographically, element by element.
    pub fn try_cmp(&self, other: &CursorValue) -> Result<Ordering, ValueError> {
        let ordering = match (self, other) {
            (CursorValue::Int(a), CursorValue::Int(b)) => a.cmp(b),
            (CursorValue::Bool(a), CursorValue::Bool(b)) => a.cmp(b),
            (CursorValue::String(a), CursorValue::String(b)) => a.cmp(b),
            (CursorValue::Time(a), CursorValue::Time(b)) => a.cmp(b),
            (CursorValue::Uuid(a), CursorValue::Uuid(b)) => a.cmp(b),
            (CursorValue::List(a), CursorValue::List(b)) => {
                for (left, right) in a.iter().zip(b.iter()) {
                    match left.try_cmp(right)? {
                        Ordering::Equal => continue,
                        other => return Ok(other),
                    }
                }
                a.len().cmp(&b.len())
            }
            (left, right) => {
                return Err(ValueError::TypeMismatch {
                    left: left.kind(),
                    right: right.kind(),
                });
            }
        };
        Ok(ordering)
    }

    /// The tuple members when this is a `List`, `None` for scalar values.
    pub fn as_list(&self) -> Option<&[CursorValue]> {
        match self {
            CursorValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl Display for CursorValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CursorValue::Int(v) => write!(f, "{v}"),
            CursorValue::Bool(v) => write!(f, "{v}"),
            CursorValue::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            CursorValue::Time(v) => write!(f, "'{}'", v.to_rfc3339()),
            CursorValue::Uuid(v) => write!(f, "'{v}'"),
            CursorValue::List(values) => {
                write!(f, "(")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for CursorValue {
    fn from(value: i64) -> Self {
        CursorValue::Int(value)
    }
}

impl From<i32> for CursorValue {
    fn from(value: i32) -> Self {
        CursorValue::Int(value.into())
    }
}

impl From<bool> for CursorValue {
    fn from(value: bool) -> Self {
        CursorValue::Bool(value)
    }
}

impl From<String> for CursorValue {
    fn from(value: String) -> Self {
        CursorValue::String(value)
    }
}

impl From<&str> for CursorValue {
    fn from(value: &str) -> Self {
        CursorValue::String(value.to_owned())
    }
}

impl From<DateTime<Utc>> for CursorValue {
    fn from(value: DateTime<Utc>) -> Self {
        CursorValue::Time(value)
    }
}

impl From<Uuid> for CursorValue {
    fn from(value: Uuid) -> Self {
        CursorValue::Uuid(value)
    }
}

impl From<Vec<CursorValue>> for CursorValue {
    fn from(values: Vec<CursorValue>) -> Self {
        CursorValue::List(values)
    }
}
