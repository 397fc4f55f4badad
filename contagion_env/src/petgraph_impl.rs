//! `petgraph` implementations of [`GraphProvider`].

use crate::GraphProvider;
use petgraph::graph::{IndexType, NodeIndex};
use petgraph::graphmap::DiGraphMap;
use petgraph::{Directed, Graph};

/// Graph maps carry arbitrary labels, so contiguity is checked for real.
impl<E> GraphProvider for DiGraphMap<usize, E> {
    fn node_labels(&self) -> Vec<usize> {
        self.nodes().collect()
    }
    
    fn out_neighbors(&self, node: usize) -> Vec<usize> {
        // For directed graph maps `neighbors` yields outgoing targets only
        self.neighbors(node).collect()
    }
    
    fn node_count(&self) -> usize {
        DiGraphMap::node_count(self)
    }
}

/// Index-based graphs label nodes by their index, which is always dense.
impl<N, E, Ix: IndexType> GraphProvider for Graph<N, E, Directed, Ix> {
    fn node_labels(&self) -> Vec<usize> {
        self.node_indices().map(|idx| idx.index()).collect()
    }
    
    fn out_neighbors(&self, node: usize) -> Vec<usize> {
        self.neighbors(NodeIndex::new(node))
            .map(|idx| idx.index())
            .collect()
    }
    
    fn node_count(&self) -> usize {
        Graph::node_count(self)
    }
}
