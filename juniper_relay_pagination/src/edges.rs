use crate::Cursor;

/// An edge of a connection: a node and the cursor pointing at it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Edge<N> {
    pub node: N,
    pub cursor: Cursor,
}

impl<N> Edge<N> {
    pub fn new(node: N, cursor: Cursor) -> Self {
        Edge { node, cursor }
    }

    /// Converts the node, keeping the cursor.
    pub fn map<T>(self, f: impl FnOnce(N) -> T) -> Edge<T> {
        Edge {
            node: f(self.node),
            cursor: self.cursor,
        }
    }
}

/// Common trait for the GraphQL edge types generated by `#[derive(RelayConnection)]`.
pub trait RelayEdge {
    /// The underlying type of Node. Will be filled in for you by the codegen.
    type NodeType;

    fn new(node: Self::NodeType, cursor: Cursor) -> Self;
}
