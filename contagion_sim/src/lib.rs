//! Contagion Monte Carlo Harness
//!
//! Runs many independent diffusion trials and reduces them to the two
//! statistics the model is studied for:
//! - **Time**: mean number of messages until full consensus, over the
//!   trials that got there
//! - **Spread**: probability that the idea (rather than the anti-idea)
//!   takes over, given that someone took over
//!
//! # Determinism
//!
//! All entropy derives from a single 64-bit master seed. Trial `i` of sweep
//! cell `c` always receives the same stream, whether trials run on one
//! thread or across the whole rayon pool, so any odd result can be replayed
//! from its seed.
//!
//! # Usage
//!
//! ```ignore
//! use contagion_sim::{make_init_state, run_time_experiment, TrialPlan};
//! use contagion_core::RateParams;
//!
//! let init = make_init_state(graph.node_count(), 0.1, 0.1)?;
//! let stats = run_time_experiment(
//!     RateParams::new(0.5, 0.5)?,
//!     &graph,
//!     &init,
//!     10_000,
//!     1_000,
//!     &TrialPlan::new(42),
//! )?;
//! println!("mean time {:.1}", stats.mean_convergence_time);
//! ```

mod config;
mod edges;
mod error;
mod experiment;
mod exporter;
mod seeds;
mod sweep;
pub mod scenarios;

pub use config::SimConfig;
pub use edges::{load_edge_list, parse_edge_list};
pub use error::SimError;
pub use experiment::{
    make_init_state, run_full_spread_experiment, run_time_experiment, SpreadOutcome, SpreadStats,
    TimeStats, TrialPlan,
};
pub use exporter::{ExperimentExport, ExperimentResults};
pub use seeds::SeedProvider;
pub use sweep::{proportion_pairs, sweep_proportions, sweep_rates, Grid, ProportionCell, RateCell};
