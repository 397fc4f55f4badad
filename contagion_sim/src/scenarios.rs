//! Named synthetic topologies for experiments.

use crate::SimError;
use petgraph::graphmap::DiGraphMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// Directed ring 0 -> 1 -> ... -> n-1 -> 0
    Cycle,
    
    /// Every ordered pair connected
    Complete,
    
    /// Hub 0 linked both ways to every leaf
    Star,
    
    /// Line with edges in both directions
    Path,
    
    /// Directed Erdős–Rényi G(n, p)
    Random,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Cycle,
            ScenarioId::Complete,
            ScenarioId::Star,
            ScenarioId::Path,
            ScenarioId::Random,
        ]
    }
    
    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Cycle => "cycle",
            ScenarioId::Complete => "complete",
            ScenarioId::Star => "star",
            ScenarioId::Path => "path",
            ScenarioId::Random => "random",
        }
    }
    
    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Cycle => "Directed ring, every node talks to its successor only",
            ScenarioId::Complete => "Everybody talks to everybody",
            ScenarioId::Star => "One hub exchanging messages with every leaf",
            ScenarioId::Path => "Bidirectional line, slowest mixing",
            ScenarioId::Random => "Directed G(n, p), each ordered pair linked independently",
        }
    }
    
    /// Builds the topology on nodes `0..n_nodes`.
    ///
    /// `edge_probability` is only used by `Random`, whose edges are drawn
    /// from a ChaCha8 stream seeded with `seed`.
    pub fn build(
        &self,
        n_nodes: usize,
        edge_probability: f64,
        seed: u64,
    ) -> Result<DiGraphMap<usize, ()>, SimError> {
        if n_nodes == 0 {
            return Err(SimError::config("scenario needs at least one node"));
        }
        
        let mut graph = DiGraphMap::with_capacity(n_nodes, n_nodes);
        for node in 0..n_nodes {
            graph.add_node(node);
        }
        
        match self {
            ScenarioId::Cycle => {
                if n_nodes > 1 {
                    for i in 0..n_nodes {
                        graph.add_edge(i, (i + 1) % n_nodes, ());
                    }
                }
            }
            ScenarioId::Complete => {
                for i in 0..n_nodes {
                    for j in (0..n_nodes).filter(|&j| j != i) {
                        graph.add_edge(i, j, ());
                    }
                }
            }
            ScenarioId::Star => {
                for leaf in 1..n_nodes {
                    graph.add_edge(0, leaf, ());
                    graph.add_edge(leaf, 0, ());
                }
            }
            ScenarioId::Path => {
                for i in 1..n_nodes {
                    graph.add_edge(i - 1, i, ());
                    graph.add_edge(i, i - 1, ());
                }
            }
            ScenarioId::Random => {
                let coin = Bernoulli::new(edge_probability).map_err(|_| {
                    SimError::config(format!(
                        "edge probability must lie in [0, 1], got {}",
                        edge_probability
                    ))
                })?;
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                for i in 0..n_nodes {
                    for j in (0..n_nodes).filter(|&j| j != i) {
                        if coin.sample(&mut rng) {
                            graph.add_edge(i, j, ());
                        }
                    }
                }
            }
        }
        
        Ok(graph)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cycle" | "ring" => Ok(ScenarioId::Cycle),
            "complete" | "clique" => Ok(ScenarioId::Complete),
            "star" => Ok(ScenarioId::Star),
            "path" | "line" => Ok(ScenarioId::Path),
            "random" | "erdos_renyi" | "gnp" => Ok(ScenarioId::Random),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
