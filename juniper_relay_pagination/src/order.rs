use crate::{Cursor, CursorValue, Edge, PaginationError};
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Direction in which to order a list of items.
#[derive(Debug, GraphQLEnum, Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq, Hash)]
#[graphql(description = "Possible directions in which to order a list of items")]
pub enum OrderDirection {
    /// Specifies an ascending order.
    #[default]
    #[graphql(name = "ASC")]
    #[serde(rename = "ASC")]
    Asc,

    /// Specifies a descending order.
    #[graphql(name = "DESC")]
    #[serde(rename = "DESC")]
    Desc,
}

impl OrderDirection {
    pub fn reverse(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }
}

impl Display for OrderDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Column and direction handed to a `RecordSource` when fetching a page.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SortKey {
    pub column: String,
    pub direction: OrderDirection,
}

/// A field a connection of `N` can be ordered by.
///
/// `name` is the GraphQL facing name of the field (usually the name of an order-field enum variant,
/// e.g. `CREATED_AT`), `column` is what the record source sorts and filters on, and `value` reads
/// the field's value off a node when minting a cursor.
pub struct OrderField<N> {
    name: String,
    column: String,
    value: fn(&N) -> CursorValue,
}

impl<N> OrderField<N> {
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        value: fn(&N) -> CursorValue,
    ) -> Self {
        OrderField {
            name: name.into(),
            column: column.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Reads this field's cursor value off a node.
    pub fn value_of(&self, node: &N) -> CursorValue {
        (self.value)(node)
    }
}

impl<N> Clone for OrderField<N> {
    fn clone(&self) -> Self {
        OrderField {
            name: self.name.clone(),
            column: self.column.clone(),
            value: self.value,
        }
    }
}

impl<N> Debug for OrderField<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderField")
            .field("name", &self.name)
            .field("column", &self.column)
            .finish()
    }
}

/// One `(field, direction)` entry of an ordering.
pub struct OrderTerm<N> {
    pub field: OrderField<N>,
    pub direction: OrderDirection,
}

impl<N> Clone for OrderTerm<N> {
    fn clone(&self) -> Self {
        OrderTerm {
            field: self.field.clone(),
            direction: self.direction,
        }
    }
}

impl<N> Debug for OrderTerm<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field.column, self.direction)
    }
}

/// How the ordering values of a node are packed into its cursor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CursorShape {
    /// Ordered by identifier only, the cursor carries no value.
    IdOnly,
    /// Ordered by one field plus the identifier, the cursor carries a single value.
    Single,
    /// Ordered by `n` fields, the cursor carries a list of `n` values.
    Tuple(usize),
}

/// A key of the total order: a column, its direction, and where its value comes from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum KeySource {
    Identifier,
    Term(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct OrderKey<'a> {
    pub column: &'a str,
    pub direction: OrderDirection,
    pub source: KeySource,
}

/// The complete ordering of a connection.
///
/// An ordering is a list of `(field, direction)` terms followed by the identifier field, which is
/// appended as the final tie breaker unless one of the terms already orders by it. This makes the
/// order total: no two records ever compare equal, which keyset pagination relies on.
///
/// The tie breaker direction is the configured `id_direction` if any, otherwise the direction of
/// the last term, otherwise ascending.
pub struct OrderSpec<N> {
    terms: Vec<OrderTerm<N>>,
    id: OrderField<N>,
    id_direction: Option<OrderDirection>,
}

impl<N> Clone for OrderSpec<N> {
    fn clone(&self) -> Self {
        OrderSpec {
            terms: self.terms.clone(),
            id: self.id.clone(),
            id_direction: self.id_direction,
        }
    }
}

impl<N> Debug for OrderSpec<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSpec")
            .field("terms", &self.terms)
            .field("id", &self.id.column)
            .field("id_direction", &self.tie_breaker_direction())
            .finish()
    }
}

impl<N> OrderSpec<N> {
    /// An ordering by identifier only.
    pub fn new(id: OrderField<N>) -> Self {
        OrderSpec {
            terms: vec![],
            id,
            id_direction: None,
        }
    }

    /// Appends an ordering term.
    pub fn then_by(mut self, field: OrderField<N>, direction: OrderDirection) -> Self {
        self.terms.push(OrderTerm { field, direction });
        self
    }

    /// Sets the direction of the identifier tie breaker.
    pub fn id_direction(mut self, direction: OrderDirection) -> Self {
        self.id_direction = Some(direction);
        self
    }

    pub fn terms(&self) -> &[OrderTerm<N>] {
        &self.terms
    }

    pub fn id_field(&self) -> &OrderField<N> {
        &self.id
    }

    fn id_position(&self) -> Option<usize> {
        self.terms
            .iter()
            .position(|term| term.field.column == self.id.column)
    }

    pub fn tie_breaker_direction(&self) -> OrderDirection {
        if let Some(position) = self.id_position() {
            return self.terms[position].direction;
        }
        self.id_direction
            .or_else(|| self.terms.last().map(|term| term.direction))
            .unwrap_or_default()
    }

    pub fn shape(&self) -> CursorShape {
        match self.terms.len() {
            0 => CursorShape::IdOnly,
            1 if self.id_position().is_some() => CursorShape::IdOnly,
            1 => CursorShape::Single,
            n => CursorShape::Tuple(n),
        }
    }

    /// Every key of the total order, most significant first.
    pub(crate) fn keys(&self) -> Vec<OrderKey<'_>> {
        if self.shape() == CursorShape::IdOnly {
            return vec![OrderKey {
                column: &self.id.column,
                direction: self.tie_breaker_direction(),
                source: KeySource::Identifier,
            }];
        }

        let mut keys: Vec<OrderKey<'_>> = self
            .terms
            .iter()
            .enumerate()
            .map(|(idx, term)| OrderKey {
                column: &term.field.column,
                direction: term.direction,
                source: KeySource::Term(idx),
            })
            .collect();
        if self.id_position().is_none() {
            keys.push(OrderKey {
                column: &self.id.column,
                direction: self.tie_breaker_direction(),
                source: KeySource::Identifier,
            });
        }
        keys
    }

    /// The sort keys to hand to a record source, flipped when paginating backwards.
    pub fn sort_keys(&self, reverse: bool) -> Vec<SortKey> {
        self.keys()
            .into_iter()
            .map(|key| SortKey {
                column: key.column.to_owned(),
                direction: if reverse {
                    key.direction.reverse()
                } else {
                    key.direction
                },
            })
            .collect()
    }

    /// Stable fingerprint of the ordering, stamped into the cursors it mints.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for key in self.keys() {
            hasher.update(key.column.as_bytes());
            hasher.update(b" ");
            hasher.update(key.direction.to_string().as_bytes());
            hasher.update(b",");
        }
        hasher.finalize()
    }

    /// Mints the cursor of a node under this ordering.
    pub fn to_cursor(&self, node: &N) -> Cursor {
        let id = self.id.value_of(node);
        let cursor = match self.shape() {
            CursorShape::IdOnly => Cursor::new(id),
            CursorShape::Single => Cursor::with_value(id, self.terms[0].field.value_of(node)),
            CursorShape::Tuple(_) => Cursor::with_value(
                id,
                CursorValue::List(
                    self.terms
                        .iter()
                        .map(|term| term.field.value_of(node))
                        .collect(),
                ),
            ),
        };
        cursor.with_order(self.fingerprint())
    }

    /// Converts a node into an edge under this ordering.
    pub fn to_edge(&self, node: N) -> Edge<N> {
        let cursor = self.to_cursor(&node);
        Edge { node, cursor }
    }
}

/// Explicit registry of the fields a node type can be ordered by.
///
/// Built once (usually alongside the schema) and passed to resolvers, which turn the client's
/// order arguments into an `OrderSpec` through it.
pub struct OrderRegistry<N> {
    id: OrderField<N>,
    fields: Vec<OrderField<N>>,
    default_direction: OrderDirection,
}

impl<N> OrderRegistry<N> {
    pub fn new(id: OrderField<N>) -> Self {
        OrderRegistry {
            id,
            fields: vec![],
            default_direction: OrderDirection::Asc,
        }
    }

    /// Registers an orderable field.
    pub fn field(mut self, field: OrderField<N>) -> Self {
        self.fields.push(field);
        self
    }

    /// Direction of the default, identifier only, ordering.
    pub fn default_direction(mut self, direction: OrderDirection) -> Self {
        self.default_direction = direction;
        self
    }

    /// Looks a field up by its GraphQL name. The identifier field can be looked up too.
    pub fn lookup(&self, name: &str) -> Result<&OrderField<N>, PaginationError> {
        if self.id.name == name {
            return Ok(&self.id);
        }
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| PaginationError::UnknownOrderField(name.to_owned()))
    }

    /// The ordering used when the client did not ask for one.
    pub fn default_spec(&self) -> OrderSpec<N> {
        OrderSpec::new(self.id.clone()).id_direction(self.default_direction)
    }

    /// Builds an ordering from `(field name, direction)` pairs. An empty list yields the default
    /// ordering.
    pub fn spec<I, F>(&self, terms: I) -> Result<OrderSpec<N>, PaginationError>
    where
        I: IntoIterator<Item = (F, OrderDirection)>,
        F: Display,
    {
        let mut spec = OrderSpec::new(self.id.clone());
        let mut any = false;
        for (name, direction) in terms {
            let field = self.lookup(&name.to_string())?;
            spec = spec.then_by(field.clone(), direction);
            any = true;
        }
        if !any {
            return Ok(self.default_spec());
        }
        Ok(spec)
    }
}
