use crate::{Edge, PageInfo, RelayEdge};

/// A page of a connection, as built by the `Paginator`.
///
/// Edges are always in the connection's natural order, whichever end the page was taken from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
    pub total_count: i32,
}

impl<N> Connection<N> {
    /// A connection without edges.
    pub fn empty() -> Self {
        Connection {
            edges: vec![],
            page_info: PageInfo::default(),
            total_count: 0,
        }
    }

    /// Converts every node, keeping cursors and page info. Typically used to turn fetched records
    /// into their GraphQL types.
    pub fn map<T>(self, mut f: impl FnMut(N) -> T) -> Connection<T> {
        Connection {
            edges: self.edges.into_iter().map(|edge| edge.map(&mut f)).collect(),
            page_info: self.page_info,
            total_count: self.total_count,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// Common trait for Relay connections. Will be implemented by the codegen.
pub trait RelayConnection {
    /// The type of the Edge - this will be added for you in the codegen.
    type EdgeType: RelayEdge<NodeType = Self::NodeType>;

    /// The underlying type of Node we're Connection-ing. Will be filled in for you by the codegen.
    type NodeType;

    /// Builds the GraphQL connection from a page built by the `Paginator`.
    fn from_connection(connection: Connection<Self::NodeType>) -> Self;
}
