//! Error types for experiments and tooling.

use contagion_core::CoreError;
use thiserror::Error;

/// Errors raised by the Monte Carlo driver, sweeps and CLI plumbing.
#[derive(Debug, Error)]
pub enum SimError {
    /// Engine construction or a run failed
    #[error(transparent)]
    Core(#[from] CoreError),
    
    /// A seed proportion is not in `[0, 1]`
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProportion { name: &'static str, value: f64 },
    
    /// Idea and anti-idea proportions cannot both fit
    #[error("p_plus + p_minus must not exceed 1 (got {p_plus} + {p_minus})")]
    ProportionOverflow { p_plus: f64, p_minus: f64 },
    
    /// Mean convergence time requested but no trial converged
    #[error("No trial converged out of {trials}")]
    NoConvergedTrials { trials: usize },
    
    /// Win probability requested but no trial reached full consensus
    #[error("No trial reached full consensus out of {trials}")]
    NoConsensus { trials: usize },
    
    /// Configuration rejected before any simulation started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    
    /// Edge list could not be parsed
    #[error("Edge list line {line}: {reason}")]
    EdgeList { line: usize, reason: String },
    
    /// File access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
    
    /// Returns true for the "nothing to average" outcomes.
    pub fn is_empty_aggregate(&self) -> bool {
        matches!(self, Self::NoConvergedTrials { .. } | Self::NoConsensus { .. })
    }
}
