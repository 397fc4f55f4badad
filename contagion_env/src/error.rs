//! Error types for the graph abstraction.

use thiserror::Error;

/// Errors raised while reading a topology from a [`GraphProvider`](crate::GraphProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The provider exposed no nodes at all
    #[error("Graph has no nodes")]
    Empty,
    
    /// Node labels are not exactly `0..node_count`
    #[error("Node labels must be exactly 0..{node_count}; found label {label}")]
    NonContiguousLabels { node_count: usize, label: usize },
    
    /// An edge points at a label that is not a node of the graph
    #[error("Node {node} has out-neighbor {neighbor} outside 0..{node_count}")]
    NeighborOutOfRange {
        node: usize,
        neighbor: usize,
        node_count: usize,
    },
}

impl GraphError {
    /// Creates a non-contiguous label error.
    pub fn non_contiguous(node_count: usize, label: usize) -> Self {
        Self::NonContiguousLabels { node_count, label }
    }
}
