use chrono::{DateTime, TimeDelta, Utc};
use juniper::{GraphQLEnum, GraphQLInputObject, GraphQLObject, ID};
use juniper_relay_pagination::{
    CursorValue, OrderDirection, OrderField, OrderFieldName, OrderRegistry, Record,
    RelayConnection,
};

/// Status of a todo.
#[derive(GraphQLEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum TodoStatus {
    InProgress,
    Completed,
}

impl TodoStatus {
    /// Stored form of the status, as compared by filters.
    pub fn as_str(self) -> &'static str {
        match self {
            TodoStatus::InProgress => "IN_PROGRESS",
            TodoStatus::Completed => "COMPLETED",
        }
    }
}

/// "Database" row for a todo.
#[derive(Debug, Clone)]
pub struct TodoRow {
    pub id: i64,
    pub text: String,
    pub priority: i64,
    pub status: TodoStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for TodoRow {
    fn column(&self, name: &str) -> Option<CursorValue> {
        match name {
            "id" => Some(self.id.into()),
            "text" => Some(self.text.clone().into()),
            "priority" => Some(self.priority.into()),
            "status" => Some(self.status.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

/// GraphQL type for a todo.
#[derive(GraphQLObject, RelayConnection, Debug, Eq, PartialEq, Clone)]
pub struct Todo {
    pub id: ID,
    pub text: String,
    pub priority: i32,
    pub status: TodoStatus,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: ID::new(row.id.to_string()),
            text: row.text,
            priority: i32::try_from(row.priority).unwrap_or(i32::MAX),
            status: row.status,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Fields todos can be ordered by.
#[derive(GraphQLEnum, OrderFieldName, Debug, Clone, Copy, Eq, PartialEq)]
pub enum TodoOrderField {
    Text,
    Priority,
    CreatedAt,
}

/// One ordering term of a todo connection.
#[derive(GraphQLInputObject, Debug, Clone)]
pub struct TodoOrder {
    pub field: TodoOrderField,
    /// Defaults to ascending.
    pub direction: Option<OrderDirection>,
}

pub fn todo_order_registry() -> OrderRegistry<TodoRow> {
    OrderRegistry::new(OrderField::new("ID", "id", |row: &TodoRow| row.id.into()))
        .field(OrderField::new("TEXT", "text", |row: &TodoRow| {
            row.text.clone().into()
        }))
        .field(OrderField::new("PRIORITY", "priority", |row: &TodoRow| {
            row.priority.into()
        }))
        .field(OrderField::new("CREATED_AT", "created_at", |row: &TodoRow| {
            row.created_at.into()
        }))
}

// ----------- Test data ------------------

/// Five todos, identifiers 1 to 5, with texts "1" to "5".
pub fn get_todo_test_data() -> Vec<TodoRow> {
    let day = |n: i64| DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_000 + n);
    vec![
        TodoRow {
            id: 1,
            text: "1".to_string(),
            priority: 2,
            status: TodoStatus::InProgress,
            created_at: day(3),
        },
        TodoRow {
            id: 2,
            text: "2".to_string(),
            priority: 1,
            status: TodoStatus::Completed,
            created_at: day(1),
        },
        TodoRow {
            id: 3,
            text: "3".to_string(),
            priority: 2,
            status: TodoStatus::InProgress,
            created_at: day(5),
        },
        TodoRow {
            id: 4,
            text: "4".to_string(),
            priority: 3,
            status: TodoStatus::Completed,
            created_at: day(2),
        },
        TodoRow {
            id: 5,
            text: "5".to_string(),
            priority: 1,
            status: TodoStatus::InProgress,
            created_at: day(4),
        },
    ]
}
