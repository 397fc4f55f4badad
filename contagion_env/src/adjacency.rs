//! Dense, immutable adjacency snapshot.

use crate::{GraphError, GraphProvider};

/// Outgoing neighbor sets for nodes `0..N`, stored in compressed rows.
///
/// Neighbor sets are deduplicated and sorted, so parallel edges in the
/// source graph collapse into one. Self-loops are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    /// `offsets[v]..offsets[v + 1]` indexes the neighbors of `v`
    offsets: Vec<usize>,
    
    /// Concatenated neighbor lists
    targets: Vec<usize>,
}

impl Adjacency {
    /// Reads and validates a topology from a provider.
    ///
    /// Fails if the graph is empty, if labels are not exactly `0..N`, or
    /// if any edge leads outside that range.
    pub fn from_provider<G: GraphProvider + ?Sized>(graph: &G) -> Result<Self, GraphError> {
        let labels = graph.node_labels();
        let node_count = labels.len();
        if node_count == 0 {
            return Err(GraphError::Empty);
        }
        
        // N distinct labels all below N is exactly {0, ..., N-1}
        let mut seen = vec![false; node_count];
        for &label in &labels {
            if label >= node_count || seen[label] {
                return Err(GraphError::non_contiguous(node_count, label));
            }
            seen[label] = true;
        }
        
        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        offsets.push(0);
        
        for node in 0..node_count {
            let mut neighbors = graph.out_neighbors(node);
            if let Some(&neighbor) = neighbors.iter().find(|&&n| n >= node_count) {
                return Err(GraphError::NeighborOutOfRange {
                    node,
                    neighbor,
                    node_count,
                });
            }
            neighbors.sort_unstable();
            neighbors.dedup();
            targets.extend_from_slice(&neighbors);
            offsets.push(targets.len());
        }
        
        Ok(Self { offsets, targets })
    }
    
    /// Builds an adjacency directly from per-node neighbor lists.
    pub fn from_lists(lists: &[Vec<usize>]) -> Result<Self, GraphError> {
        Self::from_provider(&ListGraph(lists))
    }
    
    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }
    
    /// Returns the number of distinct directed edges.
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }
    
    /// Returns the outgoing neighbors of `node`, sorted ascending.
    ///
    /// # Panics
    ///
    /// Panics if `node >= node_count()`.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.targets[self.offsets[node]..self.offsets[node + 1]]
    }
    
    /// Returns the out-degree of `node`.
    pub fn out_degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }
}

impl GraphProvider for Adjacency {
    fn node_labels(&self) -> Vec<usize> {
        (0..self.node_count()).collect()
    }
    
    fn out_neighbors(&self, node: usize) -> Vec<usize> {
        self.neighbors(node).to_vec()
    }
    
    fn node_count(&self) -> usize {
        Adjacency::node_count(self)
    }
}

/// Plain adjacency lists, node `i` being `lists[i]`.
struct ListGraph<'a>(&'a [Vec<usize>]);

impl GraphProvider for ListGraph<'_> {
    fn node_labels(&self) -> Vec<usize> {
        (0..self.0.len()).collect()
    }
    
    fn out_neighbors(&self, node: usize) -> Vec<usize> {
        self.0[node].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graphmap::DiGraphMap;
    
    #[test]
    fn test_adjacency_from_cycle() {
        let graph: DiGraphMap<usize, ()> =
            DiGraphMap::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)]);
        
        let adjacency = Adjacency::from_provider(&graph).unwrap();
        
        assert_eq!(adjacency.node_count(), 4);
        assert_eq!(adjacency.edge_count(), 4);
        assert_eq!(adjacency.neighbors(0), &[1]);
        assert_eq!(adjacency.neighbors(3), &[0]);
    }
    
    #[test]
    fn test_adjacency_rejects_gap_in_labels() {
        // Labels {0, 1, 5}
        let graph: DiGraphMap<usize, ()> = DiGraphMap::from_edges([(0, 1), (1, 5)]);
        
        let err = Adjacency::from_provider(&graph).unwrap_err();
        assert_eq!(err, GraphError::non_contiguous(3, 5));
    }
    
    #[test]
    fn test_adjacency_rejects_labels_not_starting_at_zero() {
        let graph: DiGraphMap<usize, ()> = DiGraphMap::from_edges([(1, 2), (2, 3)]);
        
        assert!(matches!(
            Adjacency::from_provider(&graph),
            Err(GraphError::NonContiguousLabels { .. })
        ));
    }
    
    #[test]
    fn test_adjacency_rejects_empty() {
        let graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        assert_eq!(Adjacency::from_provider(&graph), Err(GraphError::Empty));
    }
    
    #[test]
    fn test_adjacency_dedups_and_sorts() {
        let adjacency = Adjacency::from_lists(&[vec![2, 1, 2], vec![], vec![0]]).unwrap();
        
        assert_eq!(adjacency.neighbors(0), &[1, 2]);
        assert_eq!(adjacency.out_degree(1), 0);
        assert_eq!(adjacency.edge_count(), 3);
    }
    
    #[test]
    fn test_adjacency_rejects_dangling_edge() {
        let err = Adjacency::from_lists(&[vec![1], vec![7]]).unwrap_err();
        assert_eq!(
            err,
            GraphError::NeighborOutOfRange { node: 1, neighbor: 7, node_count: 2 }
        );
    }
    
    #[test]
    fn test_single_isolated_node() {
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        graph.add_node(0);
        
        let adjacency = Adjacency::from_provider(&graph).unwrap();
        assert_eq!(adjacency.node_count(), 1);
        assert!(adjacency.neighbors(0).is_empty());
    }
}
