pub use crate::schema::location::{
    Location, LocationRelayConnection, LocationRelayEdge, LocationRow,
};
pub use crate::schema::todo::{
    Todo, TodoOrder, TodoOrderField, TodoRelayConnection, TodoRelayEdge, TodoRow, TodoStatus,
};
use juniper::{DefaultScalarValue, EmptyMutation, EmptySubscription, Executor, RootNode};
use juniper_relay_pagination::{
    CompareOp, MemorySource, OrderRegistry, OrderSpec, PageArgs, PaginationConfig,
    PaginationError, Paginator, Predicate, RelayConnection, SelectionNeeds,
};
use std::sync::Arc;

mod location;
mod todo;

pub use crate::schema::location::{get_location_test_data, location_order};
pub use crate::schema::todo::{get_todo_test_data, todo_order_registry};

// ---------- Context -------------

#[derive(Clone)]
pub struct Context {
    pub todos: Arc<MemorySource<TodoRow>>,
    pub todo_order: Arc<OrderRegistry<TodoRow>>,
    pub locations: Arc<MemorySource<LocationRow>>,
    pub location_order: Arc<OrderSpec<LocationRow>>,
    pub pagination: PaginationConfig,
}
impl juniper::Context for Context {}

impl Context {
    /// A context over the test data.
    pub fn new(pagination: PaginationConfig) -> Self {
        Context {
            todos: Arc::new(MemorySource::new(get_todo_test_data())),
            todo_order: Arc::new(todo_order_registry()),
            locations: Arc::new(MemorySource::new(get_location_test_data())),
            location_order: Arc::new(location_order()),
            pagination,
        }
    }
}

/// The parts of the connection selected by the query, so unselected work can be skipped.
fn selection_needs(executor: &Executor<'_, '_, Context>) -> SelectionNeeds {
    SelectionNeeds::from_fields(
        executor
            .look_ahead()
            .children()
            .iter()
            .map(|child| child.field_original_name()),
    )
}

// --------- QueryRoot ------------

pub struct QueryRoot;

#[juniper::graphql_object(context = Context, scalar = DefaultScalarValue)]
impl QueryRoot {
    /// Queries for todos in the "database", optionally filtered by status and ordered by any
    /// combination of fields.
    async fn todos(
        executor: &Executor<'_, '_, Context>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        order_by: Option<Vec<TodoOrder>>,
        status: Option<TodoStatus>,
    ) -> Result<TodoRelayConnection, PaginationError> {
        let ctx = executor.context();
        let order = ctx.todo_order.spec(
            order_by
                .unwrap_or_default()
                .into_iter()
                .map(|term| (term.field, term.direction.unwrap_or_default())),
        )?;
        let filter = status
            .map(|status| vec![Predicate::compare("status", CompareOp::Eq, status.as_str())])
            .unwrap_or_default();

        let conn = Paginator::new(&order)
            .with_filter(filter)
            .with_config(&ctx.pagination)
            .paginate(
                ctx.todos.as_ref(),
                PageArgs::decode(first, after.as_deref(), last, before.as_deref())?,
                selection_needs(executor),
            )
            .await?;

        Ok(TodoRelayConnection::from_connection(conn.map(Todo::from)))
    }

    /// Queries for all locations in the "database", ordered by identifier.
    async fn locations(
        executor: &Executor<'_, '_, Context>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
    ) -> Result<LocationRelayConnection, PaginationError> {
        let ctx = executor.context();
        let conn = Paginator::new(ctx.location_order.as_ref())
            .with_config(&ctx.pagination)
            .paginate(
                ctx.locations.as_ref(),
                PageArgs::decode(first, after.as_deref(), last, before.as_deref())?,
                selection_needs(executor),
            )
            .await?;

        Ok(conn.map(Location::from).into())
    }
}

// ---------- Schema -------------

pub type Schema = RootNode<QueryRoot, EmptyMutation<Context>, EmptySubscription<Context>>;

pub fn schema() -> Schema {
    Schema::new(QueryRoot, EmptyMutation::new(), EmptySubscription::new())
}
