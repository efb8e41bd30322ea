//! Library implementing cursor based Relay pagination for the Juniper GraphQL framework.
//!
//! It turns the `first`/`after`/`last`/`before` arguments of a connection field, an ordering and
//! a source of records into a page of the connection, complete with opaque cursors and `PageInfo`.
//!
//! # Connections and Edges
//!
//! Define your normal entity struct (the `node` in Relay parlance) and then use the
//! `#[derive(RelayConnection)]` macro to generate the `Connection` and `Edge` structs, wired into
//! the `GraphQLObject` etc macros.
//!
//! ```rust
//! use juniper::GraphQLObject;
//! # use juniper_relay_pagination::RelayConnection;
//!
//! #[derive(Debug, GraphQLObject, RelayConnection, Clone, Eq, PartialEq)]
//! pub struct Todo {
//!     pub text: String,
//! }
//! ```
//!
//! Generates, written out here to show the full code:
//!
//! ```nocompile
//! #[derive(GraphQLObject)]
//! #[graphql(name = "TodoConnection")]
//! struct TodoRelayConnection {
//!     total_count: i32,
//!     edges: Vec<TodoRelayEdge>,
//!     page_info: PageInfo,
//! }
//!
//! #[derive(GraphQLObject)]
//! #[graphql(name = "TodoEdge")]
//! struct TodoRelayEdge {
//!     node: Todo,
//!     cursor: Cursor,
//! }
//! ```
//!
//! With the following types in the GraphQL schema:
//!
//! ```graphql
//! type TodoConnection {
//!     totalCount: Int!
//!     edges: [TodoEdge!]!
//!     pageInfo: PageInfo!
//! }
//!
//! type TodoEdge {
//!     node: Todo!
//!     cursor: Cursor!
//! }
//! ```
//!
//! **Notes**:
//! - The structs have `RelayConnection` and `RelayEdge` as the suffix to help avoid collisions with your code.
//! - GraphQL types have `Connection` and `Edge` as the suffix to match the Relay naming conventions.
//!
//! # Ordering
//!
//! Cursors are only stable over a total order. An `OrderSpec` lists the fields a connection is
//! ordered by, and always ends with the unique identifier field as a tie-breaker:
//!
//! ```rust
//! use juniper_relay_pagination::{CursorValue, OrderDirection, OrderField, OrderSpec};
//!
//! struct TodoRow {
//!     id: i64,
//!     priority: i64,
//! }
//!
//! let order = OrderSpec::new(OrderField::new("ID", "id", |t: &TodoRow| t.id.into()))
//!     .then_by(
//!         OrderField::new("PRIORITY", "priority", |t: &TodoRow| t.priority.into()),
//!         OrderDirection::Desc,
//!     );
//!
//! let cursor = order.to_cursor(&TodoRow { id: 3, priority: 1 });
//! assert_eq!(cursor.id, CursorValue::Int(3));
//! assert_eq!(cursor.value, Some(CursorValue::Int(1)));
//! ```
//!
//! `OrderRegistry` maps the names a client orders by (usually the variants of a `GraphQLEnum`) to
//! fields and builds specs from them, rejecting unknown names.
//!
//! # Building pages
//!
//! Records come from a `RecordSource`: it counts and fetches records matching a list of
//! `Predicate`s, sorted and limited. `MemorySource` implements it over a `Vec`, and is what the
//! example app uses; a database backed source translates predicates into its query language.
//!
//! The `Paginator` ties everything together:
//!
//! ```nocompile
//! async fn todos(
//!     first: Option<i32>,
//!     after: Option<String>,
//!     last: Option<i32>,
//!     before: Option<String>,
//!     ctx: &Context,
//! ) -> Result<TodoRelayConnection, PaginationError> {
//!     let args = PageArgs::decode(first, after.as_deref(), last, before.as_deref())?;
//!     let conn = Paginator::new(&ctx.order)
//!         .with_config(&ctx.config)
//!         .paginate(&ctx.todos, args, SelectionNeeds::all())
//!         .await?;
//!
//!     Ok(TodoRelayConnection::from_connection(conn.map(Todo::from)))
//! }
//! ```
//!
//! Taking `after` and `before` as strings and decoding them with `PageArgs::decode` reports a
//! malformed cursor as `PaginationError::InvalidCursor`, with the `INVALID_CURSOR` code.
//!
//! Only the rows of the page plus one are fetched. The extra row tells whether another page exists
//! and is dropped. Counting only happens when `totalCount` or `pageInfo` is selected, see
//! `SelectionNeeds`.
//!
//! # Cursors
//!
//! Relay requires edges and pagination info to contain opaque strings called "cursors". A
//! `Cursor` carries the identifier of a node, its ordering values and a fingerprint of the
//! ordering it was minted under. It is encoded as URL safe base64 and exposed as the `Cursor`
//! GraphQL scalar:
//!
//! ```
//! use juniper_relay_pagination::{cursor_from_encoded_string, Cursor};
//!
//! let cursor = Cursor::with_value(7, "hello");
//! let encoded = cursor.to_encoded_string();
//!
//! assert_eq!(cursor_from_encoded_string(&encoded).unwrap(), cursor);
//! ```
//!
//! A cursor minted under one ordering and passed to a connection ordered differently is rejected
//! with `PaginationError::CursorMismatch` instead of silently returning the wrong page.
//!
//! # Errors
//!
//! `PaginationError` implements `IntoFieldError`, adding a stable `code` extension to the GraphQL
//! error: `INVALID_PAGINATION`, `INVALID_CURSOR` or `INTERNAL`.
//!
//! # Example App
//!
//! You can see the library in action in the example app in `/juniper_relay_pagination_test`.
//!
//! This app is also what's used for the integration tests, so it should be a strong representation of the
//! capabilities of the library.
//!

extern crate self as juniper_relay_pagination;

mod builder;
mod config;
mod connections;
mod cursor_errors;
mod cursors;
mod edges;
mod errors;
mod order;
mod pagination;
mod predicates;
mod record_source;
mod values;

// From other crates in the workspace:
pub use juniper_relay_pagination_codegen::{OrderFieldName, RelayConnection};

// From this crate:
pub use builder::*;
pub use config::*;
pub use connections::*;
pub use cursor_errors::*;
pub use cursors::*;
pub use edges::*;
pub use errors::*;
pub use order::*;
pub use pagination::*;
pub use predicates::*;
pub use record_source::*;
pub use values::*;
