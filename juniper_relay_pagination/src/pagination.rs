use crate::{Cursor, PaginationConfig, PaginationError, cursor_from_encoded_string};
use juniper::GraphQLObject;

/// The Relay `PageInfo` object
/// <https://relay.dev/graphql/connections.htm#sec-PageInfo>
///
#[derive(Debug, GraphQLObject, Eq, PartialEq, Clone, Default)]
#[graphql(description = "Pagination information")]
pub struct PageInfo {
    /// Indicates whether there is a page following this current one
    #[graphql(description = "Indicates whether there is a page following this current one")]
    pub has_next_page: bool,

    /// Indicates whether there is a page preceding this one
    #[graphql(description = "Indicates whether there is a page preceding this one")]
    pub has_previous_page: bool,

    /// Cursor of the first edge of the page. Pass it to `before:` to fetch the previous page.
    #[graphql(
        description = "Cursor of the first edge of the page. Pass it to before: to fetch the previous page."
    )]
    pub start_cursor: Option<Cursor>,

    /// Cursor of the last edge of the page. Pass it to `after:` to fetch the following page.
    #[graphql(
        description = "Cursor of the last edge of the page. Pass it to after: to fetch the following page."
    )]
    pub end_cursor: Option<Cursor>,
}

/// The Relay pagination arguments of a connection field.
///
/// Many query resolvers take the form:
///
/// ```graphql
///  query {
///      todos(first: 10, after: "kQEA") {
///          edges { node { text } }
///     }
///  }
/// ```
///
/// Forward pagination uses `first` and `after`, backward pagination `last` and `before`. Passing
/// both `first` and `last` is rejected.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct PageArgs {
    pub first: Option<i32>,
    pub after: Option<Cursor>,
    pub last: Option<i32>,
    pub before: Option<Cursor>,
}

impl PageArgs {
    /// Helper method to build from the component parts from a query resolver
    pub fn new(
        first: Option<i32>,
        after: Option<Cursor>,
        last: Option<i32>,
        before: Option<Cursor>,
    ) -> Self {
        PageArgs {
            first,
            after,
            last,
            before,
        }
    }

    /// Builds the arguments from encoded cursors, as taken by a resolver with `String` cursor
    /// arguments. Undecodable cursors are `PaginationError::InvalidCursor` errors, which carry the
    /// `INVALID_CURSOR` code to the client.
    pub fn decode(
        first: Option<i32>,
        after: Option<&str>,
        last: Option<i32>,
        before: Option<&str>,
    ) -> Result<Self, PaginationError> {
        Ok(PageArgs {
            first,
            after: after.map(cursor_from_encoded_string).transpose()?,
            last,
            before: before.map(cursor_from_encoded_string).transpose()?,
        })
    }

    pub fn forward(first: Option<i32>, after: Option<Cursor>) -> Self {
        PageArgs {
            first,
            after,
            ..Default::default()
        }
    }

    pub fn backward(last: Option<i32>, before: Option<Cursor>) -> Self {
        PageArgs {
            last,
            before,
            ..Default::default()
        }
    }

    /// Whether the client passed any pagination argument at all.
    pub fn is_paginated(&self) -> bool {
        self.first.is_some() || self.after.is_some() || self.last.is_some() || self.before.is_some()
    }

    /// Whether an `after` or `before` cursor was passed.
    pub fn has_cursor(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Whether the page is taken from the end of the connection.
    pub fn is_backward(&self) -> bool {
        self.last.is_some()
    }

    /// Number of edges requested, `None` when the whole connection is requested.
    pub fn limit(&self) -> Option<usize> {
        self.first
            .or(self.last)
            .map(|limit| usize::try_from(limit).unwrap_or(0))
    }

    /// Whether the request asks for zero edges.
    pub fn is_empty_page(&self) -> bool {
        self.first == Some(0) || self.last == Some(0)
    }

    /// Checks the arguments against the Relay rules.
    pub fn validate(&self) -> Result<(), PaginationError> {
        match (self.first, self.last) {
            (Some(_), Some(_)) => Err(PaginationError::InvalidPagination(
                "Passing both `first` and `last` to paginate a connection is not supported."
                    .to_owned(),
            )),
            (Some(first), _) if first < 0 => Err(PaginationError::InvalidPagination(
                "`first` on a connection cannot be less than zero.".to_owned(),
            )),
            (_, Some(last)) if last < 0 => Err(PaginationError::InvalidPagination(
                "`last` on a connection cannot be less than zero.".to_owned(),
            )),
            _ => Ok(()),
        }
    }

    /// Applies the configured page size defaults and limits.
    pub fn with_config(mut self, config: &PaginationConfig) -> Result<Self, PaginationError> {
        if self.first.is_none() && self.last.is_none() {
            self.first = config.default_first();
        }
        if let Some(max) = config.max_page_size {
            for (name, value) in [("first", self.first), ("last", self.last)] {
                if let Some(value) = value
                    && value > max
                {
                    return Err(PaginationError::InvalidPagination(format!(
                        "`{name}` on a connection cannot exceed {max}."
                    )));
                }
            }
        }
        Ok(self)
    }
}

/// Which parts of a connection the client selected.
///
/// Used to skip work: when no edges are selected there is nothing to fetch, and when neither
/// `totalCount` nor `pageInfo` is selected there is nothing to count.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SelectionNeeds {
    pub edges: bool,
    pub page_info: bool,
    pub total_count: bool,
}

impl SelectionNeeds {
    /// Everything, for callers that cannot tell what was selected.
    pub fn all() -> Self {
        SelectionNeeds {
            edges: true,
            page_info: true,
            total_count: true,
        }
    }

    /// Builds the needs from the names of the fields selected on the connection, e.g. from Juniper's
    /// look-ahead.
    pub fn from_fields<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut needs = SelectionNeeds {
            edges: false,
            page_info: false,
            total_count: false,
        };
        for name in names {
            match name {
                "edges" => needs.edges = true,
                "pageInfo" => needs.page_info = true,
                "totalCount" => needs.total_count = true,
                _ => {}
            }
        }
        needs
    }

    pub(crate) fn counts(&self) -> bool {
        self.total_count || self.page_info
    }
}

impl Default for SelectionNeeds {
    fn default() -> Self {
        Self::all()
    }
}
