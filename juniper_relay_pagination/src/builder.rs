//! Connection assembly.
//!
//! Building a page goes through up to four stages:
//!
//! 1. counting: only when the total count or page info is selected (and the only stage when no
//!    edges are wanted);
//! 2. fetching: cursor predicates, order (reversed for backward pages) and `limit + 1` rows;
//! 3. trimming: the extra row, if present, proves there is another page and is dropped;
//! 4. assembling: edges and cursors, in the connection's natural order.

use crate::{
    BaseColumns, ColumnResolver, Connection, OrderSpec, PageArgs, PaginationConfig,
    PaginationError, Predicate, PredicateBuilder, RecordSource, SelectionNeeds, Stage,
};
use tracing::{debug, trace, warn};

/// Builds Relay connections over a record source.
///
/// ```rust
/// # use juniper_relay_pagination::*;
/// # #[derive(Clone)]
/// # struct Todo { id: i64 }
/// # impl Record for Todo {
/// #     fn column(&self, name: &str) -> Option<CursorValue> {
/// #         (name == "id").then(|| self.id.into())
/// #     }
/// # }
/// # async fn run() -> Result<(), PaginationError> {
/// let order = OrderSpec::new(OrderField::new("ID", "id", |t: &Todo| t.id.into()));
/// let source = MemorySource::new((1..=5).map(|id| Todo { id }).collect());
///
/// let page = Paginator::new(&order)
///     .paginate(&source, PageArgs::forward(Some(2), None), SelectionNeeds::all())
///     .await?;
/// assert_eq!(page.edges.len(), 2);
/// assert!(page.page_info.has_next_page);
/// # Ok(())
/// # }
/// ```
pub struct Paginator<'a, N> {
    order: &'a OrderSpec<N>,
    filter: Vec<Predicate>,
    resolver: &'a dyn ColumnResolver,
    config: PaginationConfig,
}

impl<'a, N> Paginator<'a, N> {
    pub fn new(order: &'a OrderSpec<N>) -> Self {
        Paginator {
            order,
            filter: vec![],
            resolver: &BaseColumns,
            config: PaginationConfig::default(),
        }
    }

    /// Restricts the connection to the records matching every predicate.
    pub fn with_filter(mut self, filter: Vec<Predicate>) -> Self {
        self.filter = filter;
        self
    }

    /// Resolves ordering columns when building cursor predicates.
    pub fn with_resolver(mut self, resolver: &'a dyn ColumnResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_config(mut self, config: &PaginationConfig) -> Self {
        self.config = *config;
        self
    }

    async fn count<S>(&self, source: &S) -> Result<i32, PaginationError>
    where
        S: RecordSource<N> + ?Sized,
    {
        let count = source
            .count(&self.filter)
            .await
            .map_err(|err| PaginationError::source_failure(Stage::Count, err))?;
        trace!(count, "counted records");
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }

    /// Builds the page of the connection described by `args`.
    pub async fn paginate<S>(
        &self,
        source: &S,
        args: PageArgs,
        needs: SelectionNeeds,
    ) -> Result<Connection<N>, PaginationError>
    where
        S: RecordSource<N> + ?Sized,
    {
        let args = match args.validate().and_then(|_| args.with_config(&self.config)) {
            Ok(args) => args,
            Err(err) => {
                warn!(error = %err, "rejected pagination arguments");
                return Err(err);
            }
        };

        let mut conn = Connection::empty();
        let (first, last) = (args.first, args.last);

        if !needs.edges || args.is_empty_page() {
            debug!(stage = "count", "edges not needed, counting only");
            if needs.counts() {
                let count = self.count(source).await?;
                conn.total_count = count;
                conn.page_info.has_next_page = first.is_some() && count > 0;
                conn.page_info.has_previous_page = last.is_some() && count > 0;
            }
            return Ok(conn);
        }

        let mut counted = false;
        if args.is_paginated() && needs.counts() {
            debug!(stage = "count", "counting records");
            conn.total_count = self.count(source).await?;
            counted = true;
        }

        let mut predicates = self.filter.clone();
        predicates.extend(
            PredicateBuilder::new(self.order)
                .with_resolver(self.resolver)
                .cursors_predicates(args.after.as_ref(), args.before.as_ref())?,
        );
        let backward = args.is_backward();
        let sort_keys = self.order.sort_keys(backward);
        let limit = args.limit();

        debug!(
            stage = "fetch",
            predicates = predicates.len(),
            ?limit,
            backward,
            "fetching records"
        );
        let mut nodes = source
            .fetch(&predicates, &sort_keys, limit.map(|limit| limit + 1))
            .await
            .map_err(|err| PaginationError::fetch_failure(err, args.has_cursor()))?;

        // A cursor means there are records on its other side.
        conn.page_info.has_previous_page = !backward && args.after.is_some();
        conn.page_info.has_next_page = backward && args.before.is_some();

        if let Some(limit) = limit
            && nodes.len() > limit
        {
            trace!(stage = "trim", "dropping lookahead row");
            if backward {
                conn.page_info.has_previous_page = true;
            } else {
                conn.page_info.has_next_page = true;
            }
            nodes.truncate(limit);
        }

        if backward {
            nodes.reverse();
        }

        trace!(stage = "assemble", edges = nodes.len(), "building edges");
        conn.edges = nodes
            .into_iter()
            .map(|node| self.order.to_edge(node))
            .collect();
        conn.page_info.start_cursor = conn.edges.first().map(|edge| edge.cursor.clone());
        conn.page_info.end_cursor = conn.edges.last().map(|edge| edge.cursor.clone());
        if !counted {
            conn.total_count = i32::try_from(conn.edges.len()).unwrap_or(i32::MAX);
        }

        Ok(conn)
    }
}

/// Builds the page of a connection described by `args`, with no filter and default settings.
pub async fn build_connection<N, S>(
    args: PageArgs,
    order: &OrderSpec<N>,
    source: &S,
    needs: SelectionNeeds,
) -> Result<Connection<N>, PaginationError>
where
    S: RecordSource<N> + ?Sized,
{
    Paginator::new(order).paginate(source, args, needs).await
}

#[cfg(test)]
mod tests {
    use crate::{
        CompareOp, Connection, Cursor, CursorValue, MemorySource, OrderDirection, OrderField,
        OrderSpec, PageArgs, PaginationConfig, PaginationError, Paginator, Predicate, Record,
        RecordSource, SelectionNeeds, SortKey, Stage, build_connection,
    };
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Eq, PartialEq)]
    struct Todo {
        id: i64,
        text: String,
        priority: i64,
        done: bool,
    }

    impl Record for Todo {
        fn column(&self, name: &str) -> Option<CursorValue> {
            match name {
                "id" => Some(self.id.into()),
                "text" => Some(self.text.clone().into()),
                "priority" => Some(self.priority.into()),
                "done" => Some(self.done.into()),
                _ => None,
            }
        }
    }

    fn id_field() -> OrderField<Todo> {
        OrderField::new("ID", "id", |t: &Todo| t.id.into())
    }

    fn text_field() -> OrderField<Todo> {
        OrderField::new("TEXT", "text", |t: &Todo| t.text.clone().into())
    }

    fn priority_field() -> OrderField<Todo> {
        OrderField::new("PRIORITY", "priority", |t: &Todo| t.priority.into())
    }

    fn by_text() -> OrderSpec<Todo> {
        OrderSpec::new(id_field()).then_by(text_field(), OrderDirection::Asc)
    }

    /// Five todos with identifiers 1..5 and texts "1".."5".
    fn five() -> MemorySource<Todo> {
        MemorySource::new(
            (1..=5)
                .map(|id| Todo {
                    id,
                    text: id.to_string(),
                    priority: id % 2,
                    done: id > 3,
                })
                .collect(),
        )
    }

    fn texts(conn: &Connection<Todo>) -> Vec<&str> {
        conn.nodes().map(|t| t.text.as_str()).collect()
    }

    fn cursor_of(conn: &Connection<Todo>, text: &str) -> Cursor {
        conn.edges
            .iter()
            .find(|edge| edge.node.text == text)
            .map(|edge| edge.cursor.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_forward_pages() {
        let order = by_text();
        let source = five();
        let all = SelectionNeeds::all();

        let page1 = build_connection(PageArgs::forward(Some(2), None), &order, &source, all)
            .await
            .unwrap();
        assert_eq!(texts(&page1), vec!["1", "2"]);
        assert!(page1.page_info.has_next_page);
        assert!(!page1.page_info.has_previous_page);
        assert_eq!(page1.total_count, 5);
        assert_eq!(page1.page_info.start_cursor, Some(cursor_of(&page1, "1")));
        assert_eq!(page1.page_info.end_cursor, Some(cursor_of(&page1, "2")));

        let after = cursor_of(&page1, "2");
        let page2 = build_connection(PageArgs::forward(Some(2), Some(after)), &order, &source, all)
            .await
            .unwrap();
        assert_eq!(texts(&page2), vec!["3", "4"]);
        assert!(page2.page_info.has_next_page);
        assert!(page2.page_info.has_previous_page);
        assert_eq!(page2.total_count, 5);

        let after = cursor_of(&page2, "4");
        let page3 = build_connection(PageArgs::forward(Some(2), Some(after)), &order, &source, all)
            .await
            .unwrap();
        assert_eq!(texts(&page3), vec!["5"]);
        assert!(!page3.page_info.has_next_page);
        assert!(page3.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_backward_pages() {
        let order = by_text();
        let source = five();
        let all = SelectionNeeds::all();

        let page1 = build_connection(PageArgs::backward(Some(2), None), &order, &source, all)
            .await
            .unwrap();
        assert_eq!(texts(&page1), vec!["4", "5"]);
        assert!(page1.page_info.has_previous_page);
        assert!(!page1.page_info.has_next_page);
        assert_eq!(page1.page_info.start_cursor, Some(cursor_of(&page1, "4")));

        let before = cursor_of(&page1, "4");
        let args = PageArgs::backward(Some(2), Some(before));
        let page2 = build_connection(args, &order, &source, all).await.unwrap();
        assert_eq!(texts(&page2), vec!["2", "3"]);
        assert!(page2.page_info.has_previous_page);
        assert!(page2.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_zero_sized_pages_only_count() {
        let order = by_text();
        let source = five();

        let first = build_connection(
            PageArgs::forward(Some(0), None),
            &order,
            &source,
            SelectionNeeds::all(),
        )
        .await
        .unwrap();
        assert!(first.edges.is_empty());
        assert_eq!(first.total_count, 5);
        assert!(first.page_info.has_next_page);
        assert!(!first.page_info.has_previous_page);
        assert_eq!(first.page_info.start_cursor, None);

        let last = build_connection(
            PageArgs::backward(Some(0), None),
            &order,
            &source,
            SelectionNeeds::all(),
        )
        .await
        .unwrap();
        assert!(last.edges.is_empty());
        assert!(last.page_info.has_previous_page);
        assert!(!last.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_after_last_record_is_empty() {
        let order = by_text();
        let source = five();
        let all = build_connection(PageArgs::default(), &order, &source, SelectionNeeds::all())
            .await
            .unwrap();
        let last_cursor = all.page_info.end_cursor.clone().unwrap();

        let page = build_connection(
            PageArgs::forward(Some(2), Some(last_cursor)),
            &order,
            &source,
            SelectionNeeds::all(),
        )
        .await
        .unwrap();
        assert!(page.edges.is_empty());
        assert!(!page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
        assert_eq!(page.page_info.start_cursor, None);
        assert_eq!(page.page_info.end_cursor, None);
        assert_eq!(page.total_count, 5);
    }

    #[tokio::test]
    async fn test_first_and_last_is_rejected() {
        let err = build_connection(
            PageArgs::new(Some(1), None, Some(1), None),
            &by_text(),
            &five(),
            SelectionNeeds::all(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_PAGINATION");
    }

    #[tokio::test]
    async fn test_no_arguments_returns_everything_uncounted() {
        let source = CountingSource::new(five());
        let conn = build_connection(
            PageArgs::default(),
            &by_text(),
            &source,
            SelectionNeeds::all(),
        )
        .await
        .unwrap();
        assert_eq!(texts(&conn), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(conn.total_count, 5);
        assert!(!conn.page_info.has_next_page);
        assert_eq!(source.counts.load(Ordering::SeqCst), 0);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_metadata_only_selection_skips_fetch() {
        let source = CountingSource::new(five());
        let conn = build_connection(
            PageArgs::forward(Some(2), None),
            &by_text(),
            &source,
            SelectionNeeds::from_fields(["totalCount"]),
        )
        .await
        .unwrap();
        assert_eq!(conn.total_count, 5);
        assert!(conn.edges.is_empty());
        assert_eq!(source.counts.load(Ordering::SeqCst), 1);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);

        let conn = build_connection(
            PageArgs::forward(Some(2), None),
            &by_text(),
            &source,
            SelectionNeeds::from_fields(["edges"]),
        )
        .await
        .unwrap();
        assert_eq!(conn.edges.len(), 2);
        // Nothing asked for a count, so none was made.
        assert_eq!(source.counts.load(Ordering::SeqCst), 1);
        assert_eq!(conn.total_count, 2);
    }

    #[tokio::test]
    async fn test_filter_applies_to_count_and_fetch() {
        let order = by_text();
        let conn = Paginator::new(&order)
            .with_filter(vec![Predicate::compare("done", CompareOp::Eq, false)])
            .paginate(
                &five(),
                PageArgs::backward(Some(2), None),
                SelectionNeeds::all(),
            )
            .await
            .unwrap();
        assert_eq!(texts(&conn), vec!["2", "3"]);
        assert_eq!(conn.total_count, 3);
        assert!(conn.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_config_default_page_size() {
        let order = by_text();
        let config = PaginationConfig {
            default_page_size: Some(3),
            max_page_size: Some(4),
        };
        let paginator = Paginator::new(&order).with_config(&config);

        let conn = paginator
            .paginate(&five(), PageArgs::default(), SelectionNeeds::all())
            .await
            .unwrap();
        assert_eq!(texts(&conn), vec!["1", "2", "3"]);
        assert!(conn.page_info.has_next_page);

        let err = paginator
            .paginate(
                &five(),
                PageArgs::forward(Some(10), None),
                SelectionNeeds::all(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PaginationError::InvalidPagination(_)));
    }

    #[tokio::test]
    async fn test_multi_field_order_with_duplicates() {
        let order = OrderSpec::new(id_field())
            .then_by(priority_field(), OrderDirection::Asc)
            .then_by(text_field(), OrderDirection::Desc);
        let source = five();

        let all = build_connection(PageArgs::default(), &order, &source, SelectionNeeds::all())
            .await
            .unwrap();
        // priority 0: ids 2, 4; priority 1: ids 1, 3, 5; texts descending within a priority.
        assert_eq!(texts(&all), vec!["4", "2", "5", "3", "1"]);

        let page = build_connection(
            PageArgs::forward(Some(2), Some(cursor_of(&all, "2"))),
            &order,
            &source,
            SelectionNeeds::all(),
        )
        .await
        .unwrap();
        assert_eq!(texts(&page), vec!["5", "3"]);
    }

    #[tokio::test]
    async fn test_source_failures_name_the_stage() {
        let order = by_text();
        let err = build_connection(
            PageArgs::forward(Some(1), None),
            &order,
            &FailingSource,
            SelectionNeeds::all(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Count));

        let err = build_connection(
            PageArgs::forward(Some(1), None),
            &order,
            &FailingSource,
            SelectionNeeds::from_fields(["edges"]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Fetch));
        assert_eq!(err.to_string(), "failed to fetch records: connection reset");
    }

    #[tokio::test]
    async fn test_cursor_value_of_the_wrong_type_is_a_cursor_error() {
        let cursor = Cursor::with_value(1, 42);
        let err = build_connection(
            PageArgs::forward(Some(1), Some(cursor)),
            &by_text(),
            &five(),
            SelectionNeeds::from_fields(["edges"]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PaginationError::Value(_)));
        assert_eq!(err.code(), "INVALID_CURSOR");
        assert_eq!(err.stage(), None);

        // Same fingerprint, different identifier type.
        let cursor = OrderSpec::new(OrderField::new("ID", "id", |s: &String| s.clone().into()))
            .to_cursor(&"lumiere".to_owned());
        let err = build_connection(
            PageArgs::forward(Some(1), Some(cursor)),
            &OrderSpec::new(id_field()),
            &five(),
            SelectionNeeds::all(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_CURSOR");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_type_mismatch_without_cursor_is_internal() {
        let order = by_text();
        let err = Paginator::new(&order)
            .with_filter(vec![Predicate::compare("text", CompareOp::Eq, 3)])
            .paginate(
                &five(),
                PageArgs::forward(Some(1), None),
                SelectionNeeds::from_fields(["edges"]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Fetch));
        assert_eq!(err.code(), "INTERNAL");
    }

    struct CountingSource {
        inner: MemorySource<Todo>,
        counts: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new(inner: MemorySource<Todo>) -> Self {
            CountingSource {
                inner,
                counts: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordSource<Todo> for CountingSource {
        type Error = <MemorySource<Todo> as RecordSource<Todo>>::Error;

        async fn count(&self, filter: &[Predicate]) -> Result<usize, Self::Error> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            self.inner.count(filter).await
        }

        async fn fetch(
            &self,
            predicates: &[Predicate],
            order: &[SortKey],
            limit: Option<usize>,
        ) -> Result<Vec<Todo>, Self::Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(predicates, order, limit).await
        }
    }

    struct FailingSource;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct ConnectionReset;

    #[async_trait]
    impl RecordSource<Todo> for FailingSource {
        type Error = ConnectionReset;

        async fn count(&self, _filter: &[Predicate]) -> Result<usize, Self::Error> {
            Err(ConnectionReset)
        }

        async fn fetch(
            &self,
            _predicates: &[Predicate],
            _order: &[SortKey],
            _limit: Option<usize>,
        ) -> Result<Vec<Todo>, Self::Error> {
            Err(ConnectionReset)
        }
    }

    // ---------------- properties ----------------

    fn todos_with_duplicates() -> impl Strategy<Value = Vec<Todo>> {
        prop::collection::vec((0i64..3, "[a-c]", any::<bool>()), 0..25).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(idx, (priority, text, done))| Todo {
                    id: idx as i64 + 1,
                    text,
                    priority,
                    done,
                })
                .collect()
        })
    }

    fn direction() -> impl Strategy<Value = OrderDirection> {
        prop_oneof![Just(OrderDirection::Asc), Just(OrderDirection::Desc)]
    }

    fn mixed_order(a: OrderDirection, b: OrderDirection, id: OrderDirection) -> OrderSpec<Todo> {
        OrderSpec::new(id_field())
            .then_by(priority_field(), a)
            .then_by(text_field(), b)
            .id_direction(id)
    }

    fn run<T>(fut: impl Future<Output = T>) -> T {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    fn ids(conn: &Connection<Todo>) -> Vec<i64> {
        conn.nodes().map(|t| t.id).collect()
    }

    /// Sorts with plain tuple comparison, independently of the record source.
    fn expected_order(todos: &[Todo], order: &OrderSpec<Todo>) -> Vec<i64> {
        let keys = order.sort_keys(false);
        let mut sorted = todos.to_vec();
        sorted.sort_by(|a, b| {
            keys.iter()
                .map(|key| {
                    let ordering = a
                        .column(&key.column)
                        .unwrap()
                        .try_cmp(&b.column(&key.column).unwrap())
                        .unwrap();
                    match key.direction {
                        OrderDirection::Asc => ordering,
                        OrderDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.into_iter().map(|t| t.id).collect()
    }

    proptest! {
        #[test]
        fn prop_forward_paging_visits_every_record_once(
            todos in todos_with_duplicates(),
            a in direction(),
            b in direction(),
            id in direction(),
            page_size in 1i32..5,
        ) {
            let order = mixed_order(a, b, id);
            let source = MemorySource::new(todos.clone());
            let expected = expected_order(&todos, &order);

            let (visited, total) = run(async {
                let mut visited = vec![];
                let mut after = None;
                loop {
                    let page = build_connection(
                        PageArgs::forward(Some(page_size), after.clone()),
                        &order,
                        &source,
                        SelectionNeeds::all(),
                    )
                    .await
                    .unwrap();
                    visited.extend(ids(&page));
                    if !page.page_info.has_next_page {
                        break (visited, page.total_count);
                    }
                    after = page.page_info.end_cursor.clone();
                }
            });

            prop_assert_eq!(visited, expected);
            prop_assert_eq!(total as usize, todos.len());
        }

        #[test]
        fn prop_backward_page_matches_forward_tail(
            todos in todos_with_duplicates(),
            a in direction(),
            b in direction(),
            last in 0usize..6,
        ) {
            let order = mixed_order(a, b, OrderDirection::Asc);
            let source = MemorySource::new(todos.clone());
            let expected = expected_order(&todos, &order);
            let tail: Vec<i64> = expected[expected.len().saturating_sub(last)..].to_vec();

            let page = run(build_connection(
                PageArgs::backward(Some(last as i32), None),
                &order,
                &source,
                SelectionNeeds::from_fields(["edges"]),
            ))
            .unwrap();

            prop_assert_eq!(ids(&page), tail);
            prop_assert_eq!(page.page_info.has_previous_page, todos.len() > last && last > 0);
        }

        #[test]
        fn prop_backward_paging_visits_every_record_once(
            todos in todos_with_duplicates(),
            a in direction(),
            b in direction(),
            page_size in 1i32..5,
        ) {
            let order = mixed_order(a, b, OrderDirection::Desc);
            let source = MemorySource::new(todos.clone());
            let expected = expected_order(&todos, &order);

            let visited = run(async {
                let mut pages = vec![];
                let mut before = None;
                loop {
                    let page = build_connection(
                        PageArgs::backward(Some(page_size), before.clone()),
                        &order,
                        &source,
                        SelectionNeeds::all(),
                    )
                    .await
                    .unwrap();
                    pages.push(ids(&page));
                    if !page.page_info.has_previous_page {
                        break;
                    }
                    before = page.page_info.start_cursor.clone();
                }
                pages.into_iter().rev().flatten().collect::<Vec<i64>>()
            });

            prop_assert_eq!(visited, expected);
        }
    }
}
