//! The graph provider trait.

/// Read-only view of a directed graph with integer node labels.
///
/// Implementations exist for `petgraph`'s `DiGraphMap<usize, E>` and
/// `Graph<N, E, Directed>`. Anything else that can list its nodes and their
/// outgoing neighbors can implement it too.
pub trait GraphProvider {
    /// Returns every node label in the graph, in any order.
    fn node_labels(&self) -> Vec<usize>;
    
    /// Returns the targets of all edges leaving `node`, in any order.
    ///
    /// Only called with labels previously returned by
    /// [`node_labels`](GraphProvider::node_labels).
    fn out_neighbors(&self, node: usize) -> Vec<usize>;
    
    /// Returns the number of nodes.
    fn node_count(&self) -> usize {
        self.node_labels().len()
    }
}

impl<G: GraphProvider + ?Sized> GraphProvider for &G {
    fn node_labels(&self) -> Vec<usize> {
        (**self).node_labels()
    }
    
    fn out_neighbors(&self, node: usize) -> Vec<usize> {
        (**self).out_neighbors(node)
    }
    
    fn node_count(&self) -> usize {
        (**self).node_count()
    }
}
