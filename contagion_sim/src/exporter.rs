//! JSON export of experiment results.
//!
//! Exports are plain data for an external renderer; nothing here draws.

use crate::config::SimConfig;
use crate::experiment::{SpreadStats, TimeStats};
use crate::sweep::{Grid, ProportionCell, RateCell};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Results of one CLI command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperimentResults {
    /// Mean convergence time at fixed rates
    Time { stats: TimeStats },
    
    /// Consensus tallies at fixed proportions
    Spread {
        stats: SpreadStats,
        idea_win_probability: f64,
    },
    
    /// Convergence time over the rate grid
    RateSweep { cells: Vec<RateCell>, grid: Grid },
    
    /// Win probability over the proportion grid
    ProportionSweep { cells: Vec<ProportionCell>, grid: Grid },
}

/// Complete experiment export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentExport {
    /// Command that produced the results
    pub experiment: String,
    
    /// Nodes in the topology actually used
    pub node_count: usize,
    
    /// Directed edges in the topology actually used
    pub edge_count: usize,
    
    /// Effective configuration
    pub config: SimConfig,
    
    /// Results
    pub results: ExperimentResults,
}

impl ExperimentExport {
    /// Creates a new export.
    pub fn new(
        experiment: &str,
        node_count: usize,
        edge_count: usize,
        config: SimConfig,
        results: ExperimentResults,
    ) -> Self {
        Self {
            experiment: experiment.to_string(),
            node_count,
            edge_count,
            config,
            results,
        }
    }
    
    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json_pretty()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_export_tags_results() {
        let export = ExperimentExport::new(
            "time",
            4,
            4,
            SimConfig::default(),
            ExperimentResults::Time {
                stats: TimeStats {
                    mean_convergence_time: 3.0,
                    converged_trials: 2,
                    total_trials: 5,
                },
            },
        );
        
        let json: serde_json::Value = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["results"]["kind"], "time");
        assert_eq!(json["results"]["stats"]["converged_trials"], 2);
        assert_eq!(json["config"]["scenario"], "cycle");
    }
    
    #[test]
    fn test_export_roundtrip() {
        let cells = vec![RateCell {
            lambda: 0.5,
            mu: 0.5,
            mean_convergence_time: Some(12.5),
            converged_trials: 3,
            total_trials: 4,
        }];
        let grid = Grid::from_rate_cells(&cells);
        let export = ExperimentExport::new(
            "sweep-rates",
            10,
            10,
            SimConfig::default(),
            ExperimentResults::RateSweep { cells, grid },
        );
        
        let back: ExperimentExport = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, export);
    }
}
