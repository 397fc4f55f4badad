//! Contagion Graph Abstraction Layer
//!
//! This crate defines the contract between the diffusion engine and whatever
//! directed-graph library supplies the topology. The engine never walks a
//! third-party graph directly during a run. Instead the topology is read once
//! through [`GraphProvider`] and frozen into a dense [`Adjacency`] that can be
//! shared between thousands of independent trials.
//!
//! # Contract
//!
//! A provider must expose:
//! - its node labels, which must be exactly the dense range `0..N`
//! - the outgoing neighbors of any node (order does not matter)
//!
//! Edge weights, attributes and mutation are never consulted.
//!
//! # Example
//!
//! ```ignore
//! use contagion_env::Adjacency;
//! use petgraph::graphmap::DiGraphMap;
//!
//! let graph: DiGraphMap<usize, ()> = DiGraphMap::from_edges([(0, 1), (1, 2), (2, 0)]);
//! let adjacency = Adjacency::from_provider(&graph)?;
//! assert_eq!(adjacency.neighbors(0), &[1]);
//! ```

mod adjacency;
mod error;
mod provider;
mod petgraph_impl;

pub use adjacency::Adjacency;
pub use error::GraphError;
pub use provider::GraphProvider;
