//! Error types for the diffusion engine.

use contagion_env::GraphError;
use thiserror::Error;

/// Errors raised by engine construction and runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The topology could not be read
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
    
    /// A rate parameter is not a probability
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    
    /// A raw state value is not one of -1, 0, 1
    #[error("Invalid opinion value {0} (expected -1, 0 or 1)")]
    InvalidOpinion(i64),
    
    /// The initial state does not cover every node
    #[error("State vector has {actual} entries but the graph has {expected} nodes")]
    StateLengthMismatch { expected: usize, actual: usize },
    
    /// Seed selection found nobody holding an opinion
    #[error("No active node to seed a message from")]
    NoActiveNodes,
}

impl CoreError {
    /// Creates an invalid probability error.
    pub fn probability(name: &'static str, value: f64) -> Self {
        Self::InvalidProbability { name, value }
    }
}
