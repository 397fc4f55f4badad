//! Contagion Core - Competitive Opinion Diffusion Engine
//!
//! Two opposing opinions, the *idea* (`+1`) and the *anti-idea* (`-1`),
//! spread over a directed graph whose remaining nodes start *indifferent*
//! (`0`). Every message event picks one active node uniformly at random and
//! lets it talk to all of its out-neighbors:
//! - an indifferent neighbor adopts the seed's opinion with probability `lambda`
//! - a neighbor holding the opposite opinion converts with probability `mu`
//!
//! A run stops at the first message after which every node holds the same
//! opinion, or when the message budget is exhausted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────────────────────┐
//! │  GraphProvider   │────►│ InfectionModel                       │
//! │  (petgraph, ...) │     │  Arc<Adjacency>  RateParams  ChaCha8 │
//! └──────────────────┘     │  StateVector (owned, per run)        │
//!                          └──────────────────┬───────────────────┘
//!                                             │ run()
//!                                             ▼
//!                                        RunRecord
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use contagion_core::{InfectionModel, RateParams, StateVector};
//!
//! let params = RateParams::new(0.5, 0.5)?;
//! let mut model = InfectionModel::new(&graph, params, 42)?;
//! let init = StateVector::from_values(&[1, -1, 0, 0])?;
//! let record = model.run(1000, &init)?;
//! println!("converged at {:?}, reward {}", record.convergence_time, model.reward());
//! ```

mod error;
mod model;
mod params;
mod record;
mod state;

pub use error::CoreError;
pub use model::InfectionModel;
pub use params::RateParams;
pub use record::RunRecord;
pub use state::{Opinion, StateVector};

// Re-export the graph contract so callers need a single import path
pub use contagion_env::{Adjacency, GraphError, GraphProvider};
