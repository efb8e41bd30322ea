use crate::{CursorError, ValueError};
use juniper::{FieldError, IntoFieldError, Object, ScalarValue, Value};

/// Boxed error of a record source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error code attached to invalid `first`/`last`/`before`/`after` arguments.
pub const INVALID_PAGINATION: &str = "INVALID_PAGINATION";

/// Error code attached to cursors that cannot be decoded or do not fit the ordering.
pub const INVALID_CURSOR: &str = "INVALID_CURSOR";

/// Error code attached to failures that are not the client's fault.
pub const INTERNAL: &str = "INTERNAL";

/// Stage of building a connection a record source failed in.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Stage {
    Count,
    Fetch,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Count => write!(f, "count"),
            Stage::Fetch => write!(f, "fetch"),
        }
    }
}

/// Errors raised while building a connection.
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    /// The pagination arguments are invalid, e.g. both `first` and `last` were passed.
    #[error("{0}")]
    InvalidPagination(String),

    /// A supplied cursor could not be decoded.
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// A supplied cursor does not fit the ordering in effect.
    #[error("cursor does not match the requested ordering: {0}")]
    CursorMismatch(String),

    /// The client asked to order by a field that is not registered.
    #[error("{0} is not a valid order field")]
    UnknownOrderField(String),

    /// A cursor value could not be compared against a record value.
    #[error("cursor value cannot be compared: {0}")]
    Value(#[from] ValueError),

    /// The record source failed to count records.
    #[error("failed to count records: {0}")]
    Count(#[source] BoxError),

    /// The record source failed to fetch records.
    #[error("failed to fetch records: {0}")]
    Fetch(#[source] BoxError),
}

impl PaginationError {
    /// Wraps a record source error with the stage it happened in.
    pub fn source_failure(stage: Stage, err: impl Into<BoxError>) -> Self {
        match stage {
            Stage::Count => PaginationError::Count(err.into()),
            Stage::Fetch => PaginationError::Fetch(err.into()),
        }
    }

    /// Wraps a record source error raised while fetching a page.
    ///
    /// A `ValueError::TypeMismatch` raised while cursor predicates were applied means the cursor
    /// holds values of the wrong type for the ordering, and is reported as such.
    pub fn fetch_failure(err: impl Into<BoxError>, with_cursor: bool) -> Self {
        let err = err.into();
        if !with_cursor {
            return PaginationError::Fetch(err);
        }
        match err.downcast::<ValueError>() {
            Ok(value) if matches!(*value, ValueError::TypeMismatch { .. }) => {
                PaginationError::Value(*value)
            }
            Ok(value) => PaginationError::Fetch(value),
            Err(err) => PaginationError::Fetch(err),
        }
    }

    /// Stable, machine readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            PaginationError::InvalidPagination(_) | PaginationError::UnknownOrderField(_) => {
                INVALID_PAGINATION
            }
            PaginationError::InvalidCursor(_)
            | PaginationError::CursorMismatch(_)
            | PaginationError::Value(_) => INVALID_CURSOR,
            PaginationError::Count(_) | PaginationError::Fetch(_) => INTERNAL,
        }
    }

    /// Whether the error was caused by the client's arguments rather than the record source.
    pub fn is_client_error(&self) -> bool {
        self.code() != INTERNAL
    }

    /// The stage a record source failure happened in, if this is one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PaginationError::Count(_) => Some(Stage::Count),
            PaginationError::Fetch(_) => Some(Stage::Fetch),
            _ => None,
        }
    }
}

impl<S: ScalarValue> IntoFieldError<S> for PaginationError {
    fn into_field_error(self) -> FieldError<S> {
        let mut extensions = Object::with_capacity(1);
        extensions.add_field("code", Value::scalar(self.code().to_owned()));
        FieldError::new(self, Value::Object(extensions))
    }
}
