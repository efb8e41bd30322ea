//! Boundary predicates for keyset pagination.
//!
//! Given the `after`/`before` cursors of a request and the ordering in effect, the
//! `PredicateBuilder` produces the predicates that restrict a scan to the records strictly after
//! (or before) the cursor, consistently with the sort order.
//!
//! For an ordering `x DESC, y ASC` with the identifier as tie breaker, resuming after a cursor
//! holding `(x1, y1, last)` yields:
//!
//! ```text
//! (x < x1 OR (x = x1 AND y > y1) OR (x = x1 AND y = y1 AND id > last))
//! ```

use crate::order::{CursorShape, KeySource};
use crate::{Cursor, CursorValue, OrderDirection, OrderSpec, PaginationError, Record, ValueError};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use tracing::trace;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl CompareOp {
    /// Whether `ordering` (left compared to right) satisfies the operator.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
        };
        write!(f, "{op}")
    }
}

/// A predicate a record source applies to its scan.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Predicate {
    /// `column op value`
    Compare {
        column: String,
        op: CompareOp,
        value: CursorValue,
    },

    /// Row value comparison: `(c1, c2, ...) op (v1, v2, ...)`, compared lexicographically.
    Composite {
        columns: Vec<String>,
        op: CompareOp,
        values: Vec<CursorValue>,
    },

    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(
        column: impl Into<String>,
        op: CompareOp,
        value: impl Into<CursorValue>,
    ) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluates the predicate against a record.
    pub fn evaluate(&self, record: &impl Record) -> Result<bool, ValueError> {
        match self {
            Predicate::Compare { column, op, value } => {
                let actual = column_value(record, column)?;
                Ok(op.matches(actual.try_cmp(value)?))
            }
            Predicate::Composite {
                columns,
                op,
                values,
            } => {
                let mut ordering = Ordering::Equal;
                for (column, value) in columns.iter().zip(values) {
                    ordering = column_value(record, column)?.try_cmp(value)?;
                    if ordering != Ordering::Equal {
                        break;
                    }
                }
                Ok(op.matches(ordering))
            }
            Predicate::And(predicates) => {
                for predicate in predicates {
                    if !predicate.evaluate(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Or(predicates) => {
                for predicate in predicates {
                    if predicate.evaluate(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

fn column_value(record: &impl Record, column: &str) -> Result<CursorValue, ValueError> {
    record
        .column(column)
        .ok_or_else(|| ValueError::MissingColumn(column.to_owned()))
}

fn write_joined<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> std::fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Compare { column, op, value } => write!(f, "{column} {op} {value}"),
            Predicate::Composite {
                columns,
                op,
                values,
            } => {
                write!(f, "(")?;
                write_joined(f, columns, ", ")?;
                write!(f, ") {op} (")?;
                write_joined(f, values, ", ")?;
                write!(f, ")")
            }
            Predicate::And(predicates) => write_joined(f, predicates, " AND "),
            Predicate::Or(predicates) => {
                write!(f, "(")?;
                for (idx, predicate) in predicates.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " OR ")?;
                    }
                    match predicate {
                        Predicate::And(inner) if inner.len() > 1 => write!(f, "({predicate})")?,
                        _ => write!(f, "{predicate}")?,
                    }
                }
                write!(f, ")")
            }
        }
    }
}

/// Resolves an ordering column to the expression a predicate compares against.
pub trait ColumnResolver: Send + Sync {
    fn resolve(&self, column: &str) -> String;
}

/// Uses column names as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseColumns;

impl ColumnResolver for BaseColumns {
    fn resolve(&self, column: &str) -> String {
        column.to_owned()
    }
}

/// Resolves columns against a query selection.
///
/// Some orderings sort on values joined into the selection (an aggregate over an edge, a column of
/// a joined table) rather than on a column of the base table. When exactly one selected expression
/// is named after the column, that expression is used; otherwise the column is qualified with the
/// base table.
#[derive(Debug, Clone, Default)]
pub struct SelectionColumns {
    table: Option<String>,
    selected: Vec<String>,
}

impl SelectionColumns {
    pub fn new(table: impl Into<String>) -> Self {
        SelectionColumns {
            table: Some(table.into()),
            selected: vec![],
        }
    }

    /// Adds a selected expression, e.g. `"users"."name"` or `COUNT(todos.id) AS todos_count`.
    pub fn select(mut self, expression: impl Into<String>) -> Self {
        self.selected.push(expression.into());
        self
    }

    fn matches(expression: &str, column: &str) -> bool {
        let name = match expression.rsplit_once(" AS ") {
            Some((_, alias)) => alias,
            None => expression.rsplit('.').next().unwrap_or(expression),
        };
        name.trim().trim_matches('"').trim_matches('`') == column
    }
}

impl ColumnResolver for SelectionColumns {
    fn resolve(&self, column: &str) -> String {
        let mut matches = self
            .selected
            .iter()
            .filter(|expression| Self::matches(expression, column));
        if let (Some(only), None) = (matches.next(), matches.next()) {
            return match only.rsplit_once(" AS ") {
                Some((_, alias)) => alias.trim().to_owned(),
                None => only.clone(),
            };
        }
        match &self.table {
            Some(table) => format!("{table}.{column}"),
            None => column.to_owned(),
        }
    }
}

/// Which side of the cursor the page lies on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Bound {
    After,
    Before,
}

impl Bound {
    /// Strict inequality selecting records on this side of a key ordered in `direction`.
    fn op(self, direction: OrderDirection) -> CompareOp {
        match (self, direction) {
            (Bound::After, OrderDirection::Asc) | (Bound::Before, OrderDirection::Desc) => {
                CompareOp::Gt
            }
            (Bound::After, OrderDirection::Desc) | (Bound::Before, OrderDirection::Asc) => {
                CompareOp::Lt
            }
        }
    }
}

/// One key of the seek predicate, in order of significance.
#[derive(Debug, Clone)]
struct SeekTerm {
    column: String,
    direction: OrderDirection,
    boundary_index: usize,
    value: CursorValue,
}

/// Builds boundary predicates from cursors.
pub struct PredicateBuilder<'a, N> {
    order: &'a OrderSpec<N>,
    resolver: &'a dyn ColumnResolver,
}

impl<'a, N> PredicateBuilder<'a, N> {
    pub fn new(order: &'a OrderSpec<N>) -> Self {
        PredicateBuilder {
            order,
            resolver: &BaseColumns,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn ColumnResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Predicates for the `after` and `before` cursors of a request.
    pub fn cursors_predicates(
        &self,
        after: Option<&Cursor>,
        before: Option<&Cursor>,
    ) -> Result<Vec<Predicate>, PaginationError> {
        let mut predicates = vec![];
        if let Some(after) = after {
            predicates.push(self.predicate(after, Bound::After)?);
        }
        if let Some(before) = before {
            predicates.push(self.predicate(before, Bound::Before)?);
        }
        Ok(predicates)
    }

    /// The predicate selecting records strictly on one side of `cursor`.
    pub fn predicate(&self, cursor: &Cursor, bound: Bound) -> Result<Predicate, PaginationError> {
        if let Some(order) = cursor.order
            && order != self.order.fingerprint()
        {
            return Err(PaginationError::CursorMismatch(
                "cursor was issued for a different ordering".to_owned(),
            ));
        }

        let terms = self.seek_terms(cursor)?;
        trace!(?bound, terms = terms.len(), "building cursor predicate");

        if let [only] = terms.as_slice() {
            return Ok(Predicate::Compare {
                column: only.column.clone(),
                op: bound.op(only.direction),
                value: only.value.clone(),
            });
        }

        let direction = terms[0].direction;
        if terms.len() == 2 && terms.iter().all(|term| term.direction == direction) {
            return Ok(Predicate::Composite {
                columns: terms.iter().map(|term| term.column.clone()).collect(),
                op: bound.op(direction),
                values: terms.iter().map(|term| term.value.clone()).collect(),
            });
        }

        Ok(compile(&terms, bound))
    }

    /// Lists the keys of the order together with the cursor's value for each.
    fn seek_terms(&self, cursor: &Cursor) -> Result<Vec<SeekTerm>, PaginationError> {
        let values: Vec<CursorValue> = match (self.order.shape(), &cursor.value) {
            (CursorShape::IdOnly, None) => vec![],
            (CursorShape::IdOnly, Some(_)) => {
                return Err(PaginationError::CursorMismatch(
                    "cursor carries order values but the connection is ordered by identifier"
                        .to_owned(),
                ));
            }
            (_, None) => {
                return Err(PaginationError::CursorMismatch(
                    "cursor carries no order values".to_owned(),
                ));
            }
            (CursorShape::Single, Some(CursorValue::List(values))) if values.len() != 1 => {
                return Err(mismatched_length(values.len(), 1));
            }
            (CursorShape::Single, Some(CursorValue::List(values))) => values.clone(),
            (CursorShape::Single, Some(value)) => vec![value.clone()],
            (CursorShape::Tuple(n), Some(CursorValue::List(values))) if values.len() != n => {
                return Err(mismatched_length(values.len(), n));
            }
            (CursorShape::Tuple(_), Some(CursorValue::List(values))) => values.clone(),
            (CursorShape::Tuple(n), Some(_)) => return Err(mismatched_length(1, n)),
        };

        Ok(self
            .order
            .keys()
            .into_iter()
            .enumerate()
            .map(|(boundary_index, key)| SeekTerm {
                column: self.resolver.resolve(key.column),
                direction: key.direction,
                boundary_index,
                value: match key.source {
                    KeySource::Identifier => cursor.id.clone(),
                    KeySource::Term(idx) => values[idx].clone(),
                },
            })
            .collect())
    }
}

fn mismatched_length(got: usize, expected: usize) -> PaginationError {
    PaginationError::CursorMismatch(format!(
        "cursor values length {got} do not match order fields length {expected}"
    ))
}

/// `OR` over every boundary position `i` of: equality on all keys before `i`, and a strict
/// inequality in the key's direction on key `i`.
fn compile(terms: &[SeekTerm], bound: Bound) -> Predicate {
    let branches = terms
        .iter()
        .map(|boundary| {
            let mut ands: Vec<Predicate> = terms[..boundary.boundary_index]
                .iter()
                .map(|term| Predicate::Compare {
                    column: term.column.clone(),
                    op: CompareOp::Eq,
                    value: term.value.clone(),
                })
                .collect();
            ands.push(Predicate::Compare {
                column: boundary.column.clone(),
                op: bound.op(boundary.direction),
                value: boundary.value.clone(),
            });
            Predicate::And(ands)
        })
        .collect();
    Predicate::Or(branches)
}
