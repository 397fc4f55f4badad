//! Per-node ternary opinions and the state vector.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Opinion held by a single node.
///
/// Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
#[repr(i8)]
pub enum Opinion {
    /// Holds the anti-idea (`-1`)
    AntiIdea = -1,
    
    /// Has adopted neither side (`0`)
    Indifferent = 0,
    
    /// Holds the idea (`+1`)
    Idea = 1,
}

impl Opinion {
    /// Returns the integer encoding.
    pub fn as_i8(self) -> i8 {
        self as i8
    }
    
    /// Returns true for `Idea` and `AntiIdea`.
    pub fn is_active(self) -> bool {
        self != Opinion::Indifferent
    }
    
    /// Returns the opposing opinion. Indifference has no opposite.
    pub fn opposite(self) -> Opinion {
        match self {
            Opinion::Idea => Opinion::AntiIdea,
            Opinion::AntiIdea => Opinion::Idea,
            Opinion::Indifferent => Opinion::Indifferent,
        }
    }
}

impl From<Opinion> for i8 {
    fn from(opinion: Opinion) -> Self {
        opinion.as_i8()
    }
}

impl TryFrom<i8> for Opinion {
    type Error = CoreError;
    
    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Opinion::AntiIdea),
            0 => Ok(Opinion::Indifferent),
            1 => Ok(Opinion::Idea),
            other => Err(CoreError::InvalidOpinion(other as i64)),
        }
    }
}

impl fmt::Display for Opinion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Ordered opinions of nodes `0..N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector(Vec<Opinion>);

impl StateVector {
    /// Wraps an opinion vector.
    pub fn new(opinions: Vec<Opinion>) -> Self {
        Self(opinions)
    }
    
    /// Parses raw integer values, rejecting anything outside `{-1, 0, 1}`.
    pub fn from_values(values: &[i8]) -> Result<Self, CoreError> {
        values
            .iter()
            .map(|&v| Opinion::try_from(v))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
    
    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }
    
    /// Returns true if the vector covers no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    
    /// Counts nodes holding `opinion`.
    pub fn count(&self, opinion: Opinion) -> usize {
        self.0.iter().filter(|&&o| o == opinion).count()
    }
    
    /// Counts nodes holding either opinion.
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|o| o.is_active()).count()
    }
    
    /// Returns the shared opinion if every node holds the same active one.
    pub fn consensus(&self) -> Option<Opinion> {
        let first = *self.0.first()?;
        if first.is_active() && self.0.iter().all(|&o| o == first) {
            Some(first)
        } else {
            None
        }
    }
    
    /// Returns the opinions as a slice.
    pub fn as_slice(&self) -> &[Opinion] {
        &self.0
    }
    
    /// Returns the integer encoding of every node.
    pub fn to_values(&self) -> Vec<i8> {
        self.0.iter().map(|o| o.as_i8()).collect()
    }
    
    /// Overwrites one node and returns what it held before.
    pub(crate) fn replace(&mut self, node: usize, opinion: Opinion) -> Opinion {
        std::mem::replace(&mut self.0[node], opinion)
    }
}

impl Index<usize> for StateVector {
    type Output = Opinion;
    
    fn index(&self, node: usize) -> &Opinion {
        &self.0[node]
    }
}

impl From<Vec<Opinion>> for StateVector {
    fn from(opinions: Vec<Opinion>) -> Self {
        Self(opinions)
    }
}

impl FromIterator<Opinion> for StateVector {
    fn from_iter<I: IntoIterator<Item = Opinion>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_opinion_roundtrip_values() {
        for value in [-1i8, 0, 1] {
            assert_eq!(Opinion::try_from(value).unwrap().as_i8(), value);
        }
        assert_eq!(Opinion::try_from(2), Err(CoreError::InvalidOpinion(2)));
    }
    
    #[test]
    fn test_opinion_opposite() {
        assert_eq!(Opinion::Idea.opposite(), Opinion::AntiIdea);
        assert_eq!(Opinion::AntiIdea.opposite(), Opinion::Idea);
        assert_eq!(Opinion::Indifferent.opposite(), Opinion::Indifferent);
    }
    
    #[test]
    fn test_state_counts() {
        let state = StateVector::from_values(&[1, -1, 0, 1]).unwrap();
        
        assert_eq!(state.len(), 4);
        assert_eq!(state.count(Opinion::Idea), 2);
        assert_eq!(state.count(Opinion::AntiIdea), 1);
        assert_eq!(state.active_count(), 3);
        assert_eq!(state[2], Opinion::Indifferent);
    }
    
    #[test]
    fn test_consensus_requires_active_agreement() {
        assert_eq!(
            StateVector::from_values(&[1, 1, 1]).unwrap().consensus(),
            Some(Opinion::Idea)
        );
        assert_eq!(
            StateVector::from_values(&[-1]).unwrap().consensus(),
            Some(Opinion::AntiIdea)
        );
        assert_eq!(StateVector::from_values(&[1, -1]).unwrap().consensus(), None);
        assert_eq!(StateVector::from_values(&[0, 0]).unwrap().consensus(), None);
        assert_eq!(StateVector::default().consensus(), None);
    }
    
    #[test]
    fn test_from_values_rejects_out_of_domain() {
        assert!(StateVector::from_values(&[1, 3, 0]).is_err());
    }
    
    #[test]
    fn test_state_serializes_as_integers() {
        let state = StateVector::from_values(&[-1, 0, 1]).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "[-1,0,1]");
        
        let back: StateVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        
        assert!(serde_json::from_str::<StateVector>("[1,2]").is_err());
    }
}
