//! Run configuration.

use crate::edges::load_edge_list;
use crate::experiment::TrialPlan;
use crate::scenarios::ScenarioId;
use crate::seeds::SeedProvider;
use crate::sweep::proportion_pairs;
use crate::SimError;
use contagion_core::RateParams;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for an experiment run.
///
/// Loaded from JSON (every field optional) and then overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,
    
    /// Number of nodes in synthetic scenarios
    pub nodes: usize,
    
    /// Synthetic topology
    pub scenario: ScenarioId,
    
    /// Edge probability for the random scenario
    pub edge_probability: f64,
    
    /// Edge-list file; replaces the scenario when set
    pub edges_file: Option<PathBuf>,
    
    /// Adoption probability
    pub lambda: f64,
    
    /// Conversion probability
    pub mu: f64,
    
    /// Share of nodes seeded with the idea
    pub p_plus: f64,
    
    /// Share of nodes seeded with the anti-idea
    pub p_minus: f64,
    
    /// Trials per experiment (or per sweep cell)
    pub n_simulations: usize,
    
    /// Message budget per trial
    pub n_messages: u64,
    
    /// Fan trials out over all cores
    pub parallel: bool,
    
    /// TRACE progress every N messages (0 = off)
    pub trace_interval: u64,
    
    /// Lambda axis for rate sweeps
    pub lambdas: Vec<f64>,
    
    /// Mu axis for rate sweeps
    pub mus: Vec<f64>,
    
    /// Idea-share axis for proportion sweeps
    pub p_plus_values: Vec<f64>,
    
    /// Anti-idea-share axis for proportion sweeps
    pub p_minus_values: Vec<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let axis = vec![0.1, 0.3, 0.5, 0.7, 0.9];
        let shares = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        Self {
            seed: 42,
            nodes: 50,
            scenario: ScenarioId::Cycle,
            edge_probability: 0.1,
            edges_file: None,
            lambda: 0.5,
            mu: 0.5,
            p_plus: 0.1,
            p_minus: 0.1,
            n_simulations: 1000,
            n_messages: 1000,
            parallel: true,
            trace_interval: 0,
            lambdas: axis.clone(),
            mus: axis,
            p_plus_values: shares.clone(),
            p_minus_values: shares,
        }
    }
}

impl SimConfig {
    /// Reads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
    
    /// Checks everything that can be checked before simulating.
    pub fn validate(&self) -> Result<(), SimError> {
        self.rate_params()?;
        
        if self.edges_file.is_none() && self.nodes == 0 {
            return Err(SimError::config("nodes must be positive"));
        }
        if self.n_simulations == 0 {
            return Err(SimError::config("n_simulations must be positive"));
        }
        if self.n_messages == 0 {
            return Err(SimError::config("n_messages must be positive"));
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            return Err(SimError::config(format!(
                "edge_probability must lie in [0, 1], got {}",
                self.edge_probability
            )));
        }
        
        for (name, value) in [("p_plus", self.p_plus), ("p_minus", self.p_minus)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidProportion { name, value });
            }
        }
        if self.p_plus + self.p_minus > 1.0 {
            return Err(SimError::ProportionOverflow {
                p_plus: self.p_plus,
                p_minus: self.p_minus,
            });
        }
        
        for &lambda in &self.lambdas {
            RateParams::new(lambda, self.mu)?;
        }
        for &mu in &self.mus {
            RateParams::new(self.lambda, mu)?;
        }
        
        Ok(())
    }
    
    /// Adoption and conversion probabilities.
    pub fn rate_params(&self) -> Result<RateParams, SimError> {
        Ok(RateParams::new(self.lambda, self.mu)?)
    }
    
    /// Trial plan derived from the seed and scheduling flag.
    pub fn plan(&self) -> TrialPlan {
        TrialPlan {
            seeds: SeedProvider::new(self.seed),
            parallel: self.parallel,
            trace_interval: self.trace_interval,
        }
    }
    
    /// Proportion sweep pairs that fit in the population.
    pub fn proportion_pairs(&self) -> Vec<(f64, f64)> {
        proportion_pairs(&self.p_plus_values, &self.p_minus_values)
    }
    
    /// Loads the edge-list file if set, otherwise builds the scenario.
    pub fn load_graph(&self) -> Result<DiGraphMap<usize, ()>, SimError> {
        match &self.edges_file {
            Some(path) => load_edge_list(path),
            None => {
                let seed = SeedProvider::new(self.seed).topology_seed();
                self.scenario.build(self.nodes, self.edge_probability, seed)
            }
        }
    }
}
