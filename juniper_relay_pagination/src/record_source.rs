use crate::{CursorValue, OrderDirection, Predicate, SortKey, ValueError};
use async_trait::async_trait;
use std::cmp::Ordering;

/// A record that exposes its column values to predicates and sorting.
pub trait Record {
    /// The value of the named column, `None` if the record has no such column.
    fn column(&self, name: &str) -> Option<CursorValue>;
}

/// The query layer a connection is built on top of.
///
/// Implementations translate predicates and sort keys into their own query language (SQL, a
/// key-value scan, an in-memory filter, ...). Both methods are awaited at most once per connection,
/// count first, and never concurrently.
#[async_trait]
pub trait RecordSource<R>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Counts the records matching `filter`. No ordering or limit applies.
    async fn count(&self, filter: &[Predicate]) -> Result<usize, Self::Error>;

    /// Fetches the records matching every predicate, ordered by `order`, returning at most `limit`
    /// records when a limit is given.
    async fn fetch(
        &self,
        predicates: &[Predicate],
        order: &[SortKey],
        limit: Option<usize>,
    ) -> Result<Vec<R>, Self::Error>;
}

/// A record source over records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource<R> {
    records: Vec<R>,
}

impl<R> MemorySource<R> {
    pub fn new(records: Vec<R>) -> Self {
        MemorySource { records }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }
}

impl<R: Record> MemorySource<R> {
    fn matching<'a>(&'a self, predicates: &[Predicate]) -> Result<Vec<&'a R>, ValueError> {
        let mut out = vec![];
        'records: for record in &self.records {
            for predicate in predicates {
                if !predicate.evaluate(record)? {
                    continue 'records;
                }
            }
            out.push(record);
        }
        Ok(out)
    }
}

fn sort_records<R: Record>(records: &mut [&R], order: &[SortKey]) -> Result<(), ValueError> {
    let mut failure = None;
    records.sort_by(|a, b| {
        for key in order {
            let ordering = match (a.column(&key.column), b.column(&key.column)) {
                (Some(left), Some(right)) => left.try_cmp(&right),
                _ => Err(ValueError::MissingColumn(key.column.clone())),
            };
            match ordering {
                Ok(Ordering::Equal) => continue,
                Ok(ordering) if key.direction == OrderDirection::Desc => return ordering.reverse(),
                Ok(ordering) => return ordering,
                Err(err) => {
                    failure.get_or_insert(err);
                    return Ordering::Equal;
                }
            }
        }
        Ordering::Equal
    });
    failure.map_or(Ok(()), Err)
}

#[async_trait]
impl<R> RecordSource<R> for MemorySource<R>
where
    R: Record + Clone + Send + Sync,
{
    type Error = ValueError;

    async fn count(&self, filter: &[Predicate]) -> Result<usize, Self::Error> {
        Ok(self.matching(filter)?.len())
    }

    async fn fetch(
        &self,
        predicates: &[Predicate],
        order: &[SortKey],
        limit: Option<usize>,
    ) -> Result<Vec<R>, Self::Error> {
        let mut records = self.matching(predicates)?;
        sort_records(&mut records, order)?;
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records.into_iter().cloned().collect())
    }
}
