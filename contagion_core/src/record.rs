//! Outcome of a single run.

use crate::{Opinion, StateVector};
use serde::{Deserialize, Serialize};

/// Final state and convergence time of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// States after the last processed message
    pub final_state: StateVector,
    
    /// Index of the first message after which all nodes agreed,
    /// `None` if the budget ran out first
    pub convergence_time: Option<u64>,
    
    /// Number of message events actually processed
    pub messages_processed: u64,
}

impl RunRecord {
    /// Returns true if the run reached full consensus.
    pub fn converged(&self) -> bool {
        self.convergence_time.is_some()
    }
    
    /// Returns the opinion shared by every node of the final state, if any.
    pub fn winner(&self) -> Option<Opinion> {
        self.final_state.consensus()
    }
    
    /// Returns the number of nodes ending on the idea.
    pub fn reward(&self) -> usize {
        self.final_state.count(Opinion::Idea)
    }
}
