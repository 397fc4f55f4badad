//! Parameter sweeps and heatmap-shaped result grids.
//!
//! A sweep runs one experiment per grid cell. Each cell draws from its own
//! seed stream (`plan.for_cell(index)`), and an empty aggregate in a cell is
//! kept as `None` rather than aborting the whole sweep.

use crate::experiment::{
    convergence_times, make_init_state, spread_tally, SpreadStats, TimeStats, TrialPlan,
};
use crate::SimError;
use contagion_core::{CoreError, InfectionModel, RateParams, StateVector};
use contagion_env::{Adjacency, GraphProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one `(lambda, mu)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCell {
    pub lambda: f64,
    pub mu: f64,
    
    /// `None` when no trial converged
    pub mean_convergence_time: Option<f64>,
    pub converged_trials: usize,
    pub total_trials: usize,
}

/// Result of one `(p_plus, p_minus)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionCell {
    pub p_plus: f64,
    pub p_minus: f64,
    
    /// `None` when no trial reached full consensus
    pub idea_win_probability: Option<f64>,
    pub stats: SpreadStats,
}

/// Mean convergence time over `lambdas x mus`, lambda-major.
pub fn sweep_rates<G: GraphProvider + ?Sized>(
    lambdas: &[f64],
    mus: &[f64],
    graph: &G,
    init_state: &StateVector,
    n_simulations: usize,
    n_messages: u64,
    plan: &TrialPlan,
) -> Result<Vec<RateCell>, SimError> {
    let adjacency = Arc::new(Adjacency::from_provider(graph).map_err(CoreError::from)?);
    let mut cells = Vec::with_capacity(lambdas.len() * mus.len());
    
    for (index, (&lambda, &mu)) in lambdas
        .iter()
        .flat_map(|l| mus.iter().map(move |m| (l, m)))
        .enumerate()
    {
        let params = RateParams::new(lambda, mu)?;
        let cell_plan = plan.for_cell(index as u64);
        let template = InfectionModel::from_adjacency(
            Arc::clone(&adjacency),
            params,
            cell_plan.seeds.master_seed(),
        );
        
        let times = convergence_times(&template, init_state, n_simulations, n_messages, &cell_plan)?;
        let cell = match TimeStats::from_times(&times) {
            Ok(stats) => RateCell {
                lambda,
                mu,
                mean_convergence_time: Some(stats.mean_convergence_time),
                converged_trials: stats.converged_trials,
                total_trials: stats.total_trials,
            },
            Err(SimError::NoConvergedTrials { trials }) => RateCell {
                lambda,
                mu,
                mean_convergence_time: None,
                converged_trials: 0,
                total_trials: trials,
            },
            Err(e) => return Err(e),
        };
        
        info!(
            lambda,
            mu,
            mean = ?cell.mean_convergence_time,
            converged = cell.converged_trials,
            "rate cell done"
        );
        cells.push(cell);
    }
    
    Ok(cells)
}

/// Idea win probability for every `(p_plus, p_minus)` pair.
///
/// A pair that seeds no active node on this graph runs no trials and is
/// kept as an empty cell.
pub fn sweep_proportions(
    pairs: &[(f64, f64)],
    model: &InfectionModel,
    n_simulations: usize,
    n_messages: u64,
    plan: &TrialPlan,
) -> Result<Vec<ProportionCell>, SimError> {
    let mut cells = Vec::with_capacity(pairs.len());
    
    for (index, &(p_plus, p_minus)) in pairs.iter().enumerate() {
        let cell_plan = plan.for_cell(index as u64);
        let init_state = make_init_state(model.node_count(), p_plus, p_minus)?;
        let stats = if init_state.active_count() == 0 {
            warn!(p_plus, p_minus, "no seeded nodes, skipping cell");
            SpreadStats::default()
        } else {
            spread_tally(&init_state, model, n_simulations, n_messages, &cell_plan)?
        };
        let cell = ProportionCell {
            p_plus,
            p_minus,
            idea_win_probability: stats.idea_win_probability(),
            stats,
        };
        
        info!(
            p_plus,
            p_minus,
            probability = ?cell.idea_win_probability,
            "proportion cell done"
        );
        cells.push(cell);
    }
    
    Ok(cells)
}

/// All `(p_plus, p_minus)` combinations whose sum does not exceed 1.
pub fn proportion_pairs(p_plus_values: &[f64], p_minus_values: &[f64]) -> Vec<(f64, f64)> {
    p_plus_values
        .iter()
        .flat_map(|&p| p_minus_values.iter().map(move |&m| (p, m)))
        .filter(|&(p, m)| p + m <= 1.0)
        .collect()
}

/// Two-axis table of optional values, ready for a heatmap renderer.
///
/// `values[r][c]` belongs to `rows[r]` and `columns[c]`; cells never
/// observed stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub row_label: String,
    pub column_label: String,
    pub rows: Vec<f64>,
    pub columns: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl Grid {
    /// Builds a grid from `(row, column, value)` points. Both axes are the
    /// sorted distinct coordinates of their own dimension.
    pub fn from_points(
        row_label: &str,
        column_label: &str,
        points: impl IntoIterator<Item = (f64, f64, Option<f64>)>,
    ) -> Self {
        let points: Vec<_> = points.into_iter().collect();
        let rows = distinct_sorted(points.iter().map(|p| p.0));
        let columns = distinct_sorted(points.iter().map(|p| p.1));
        
        let mut values = vec![vec![None; columns.len()]; rows.len()];
        for (row, column, value) in points {
            if let (Some(r), Some(c)) = (position(&rows, row), position(&columns, column)) {
                values[r][c] = value;
            }
        }
        
        Self {
            row_label: row_label.to_string(),
            column_label: column_label.to_string(),
            rows,
            columns,
            values,
        }
    }
    
    /// Mean convergence time with `mu` down and `lambda` across.
    pub fn from_rate_cells(cells: &[RateCell]) -> Self {
        Self::from_points(
            "mu",
            "lambda",
            cells.iter().map(|c| (c.mu, c.lambda, c.mean_convergence_time)),
        )
    }
    
    /// Idea win probability with `p_minus` down and `p_plus` across.
    pub fn from_proportion_cells(cells: &[ProportionCell]) -> Self {
        Self::from_points(
            "p_minus",
            "p_plus",
            cells.iter().map(|c| (c.p_minus, c.p_plus, c.idea_win_probability)),
        )
    }
    
    /// Value at the given coordinates, if both are on the axes.
    pub fn get(&self, row: f64, column: f64) -> Option<f64> {
        let r = position(&self.rows, row)?;
        let c = position(&self.columns, column)?;
        self.values[r][c]
    }
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

fn position(axis: &[f64], value: f64) -> Option<usize> {
    axis.iter().position(|&v| v == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::make_init_state;
    use petgraph::graphmap::DiGraphMap;
    
    fn cycle(n: usize) -> DiGraphMap<usize, ()> {
        DiGraphMap::from_edges((0..n).map(|i| (i, (i + 1) % n)))
    }
    
    #[test]
    fn test_proportion_pairs_respect_budget() {
        let pairs = proportion_pairs(&[0.2, 0.6], &[0.3, 0.5]);
        assert_eq!(pairs, vec![(0.2, 0.3), (0.2, 0.5), (0.6, 0.3)]);
    }
    
    #[test]
    fn test_grid_axes_follow_their_own_dimension() {
        // Distinct p_minus values differ from the p_plus ones
        let cells = [
            (0.1, 0.05, Some(0.2)),
            (0.1, 0.15, Some(0.1)),
            (0.3, 0.05, Some(0.9)),
        ];
        let grid = Grid::from_points(
            "p_minus",
            "p_plus",
            cells.iter().map(|&(p, m, v)| (m, p, v)),
        );
        
        assert_eq!(grid.rows, vec![0.05, 0.15]);
        assert_eq!(grid.columns, vec![0.1, 0.3]);
        assert_eq!(grid.get(0.05, 0.3), Some(0.9));
        assert_eq!(grid.get(0.15, 0.3), None);
        assert_eq!(grid.values, vec![vec![Some(0.2), Some(0.9)], vec![Some(0.1), None]]);
    }
    
    #[test]
    fn test_sweep_rates_order_and_empty_cells() {
        let init = StateVector::from_values(&[1, -1, 0, 0]).unwrap();
        let plan = TrialPlan::new(8).sequential();
        
        let cells = sweep_rates(&[0.5, 1.0], &[0.0, 1.0], &cycle(4), &init, 10, 200, &plan).unwrap();
        
        let coords: Vec<_> = cells.iter().map(|c| (c.lambda, c.mu)).collect();
        assert_eq!(coords, vec![(0.5, 0.0), (0.5, 1.0), (1.0, 0.0), (1.0, 1.0)]);
        
        // Without conversion the -1 at node 1 survives forever
        assert_eq!(cells[0].mean_convergence_time, None);
        assert_eq!(cells[2].mean_convergence_time, None);
        assert_eq!(cells[2].total_trials, 10);
        
        let grid = Grid::from_rate_cells(&cells);
        assert_eq!(grid.rows, vec![0.0, 1.0]);
        assert_eq!(grid.columns, vec![0.5, 1.0]);
    }
    
    #[test]
    fn test_sweep_rates_rejects_bad_probability() {
        let init = make_init_state(4, 0.5, 0.0).unwrap();
        let plan = TrialPlan::new(1);
        
        let err = sweep_rates(&[1.2], &[0.5], &cycle(4), &init, 1, 10, &plan).unwrap_err();
        assert!(matches!(err, SimError::Core(_)));
    }
    
    #[test]
    fn test_sweep_proportions_cells() {
        let params = RateParams::new(1.0, 1.0).unwrap();
        let model = InfectionModel::new(&cycle(10), params, 0).unwrap();
        let pairs = proportion_pairs(&[0.2, 0.5], &[0.0]);
        
        let cells = sweep_proportions(&pairs, &model, 6, 5000, &TrialPlan::new(2)).unwrap();
        
        assert_eq!(cells.len(), 2);
        // Only idea seeds: whenever consensus happens, the idea wins
        for cell in &cells {
            assert!(matches!(cell.idea_win_probability, Some(p) if p == 1.0));
            assert_eq!(cell.stats.total_trials, 6);
        }
    }
    
    #[test]
    fn test_sweep_proportions_keeps_unseeded_cells() {
        let params = RateParams::new(1.0, 1.0).unwrap();
        let model = InfectionModel::new(&cycle(10), params, 0).unwrap();
        // (0.0, 0.0) seeds nobody, floor(10 * 0.05) == 0 seeds nobody either
        let pairs = proportion_pairs(&[0.0, 0.05, 0.5], &[0.0]);
        
        let cells = sweep_proportions(&pairs, &model, 4, 5000, &TrialPlan::new(9)).unwrap();
        
        assert_eq!(cells.len(), 3);
        for empty in &cells[..2] {
            assert_eq!(empty.idea_win_probability, None);
            assert_eq!(empty.stats, SpreadStats::default());
        }
        assert_eq!(cells[2].p_plus, 0.5);
        assert_eq!(cells[2].idea_win_probability, Some(1.0));
        assert_eq!(cells[2].stats.total_trials, 4);
        
        let grid = Grid::from_proportion_cells(&cells);
        assert_eq!(grid.get(0.0, 0.0), None);
        assert_eq!(grid.get(0.0, 0.5), Some(1.0));
    }
}
