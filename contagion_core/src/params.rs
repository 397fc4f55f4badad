//! Model parameters.

use crate::CoreError;
use serde::{Deserialize, Serialize};

/// Adoption and conversion probabilities, fixed for an engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateParams")]
pub struct RateParams {
    lambda: f64,
    mu: f64,
}

impl RateParams {
    /// Validates and creates a parameter pair.
    ///
    /// Both values must be finite and lie in `[0, 1]`; nothing is clamped.
    pub fn new(lambda: f64, mu: f64) -> Result<Self, CoreError> {
        check_probability("lambda", lambda)?;
        check_probability("mu", mu)?;
        Ok(Self { lambda, mu })
    }
    
    /// Probability that an indifferent neighbor adopts the seed's opinion.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
    
    /// Probability that an opposing neighbor converts to the seed's opinion.
    pub fn mu(&self) -> f64 {
        self.mu
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), CoreError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::probability(name, value))
    }
}

#[derive(Deserialize)]
struct RawRateParams {
    lambda: f64,
    mu: f64,
}

impl TryFrom<RawRateParams> for RateParams {
    type Error = CoreError;
    
    fn try_from(raw: RawRateParams) -> Result<Self, Self::Error> {
        RateParams::new(raw.lambda, raw.mu)
    }
}
