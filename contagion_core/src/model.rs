//! The simulation engine.

use crate::{CoreError, Opinion, RateParams, RunRecord, StateVector};
use contagion_env::{Adjacency, GraphProvider};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, trace};

/// Markov opinion-diffusion model over a fixed directed graph.
///
/// The engine owns its state vector and RNG exclusively. Topology is held
/// behind an `Arc` so that [`fork`](InfectionModel::fork) can hand each
/// Monte Carlo trial a private engine without copying the graph.
#[derive(Debug, Clone)]
pub struct InfectionModel {
    /// Frozen topology (shared between forks)
    adjacency: Arc<Adjacency>,
    
    /// Adoption / conversion probabilities
    params: RateParams,
    
    /// Seed the RNG was last initialized from
    seed: u64,
    
    /// Per-engine random stream
    rng: ChaCha8Rng,
    
    /// Current opinions (empty until the first run)
    states: StateVector,
    
    /// Nodes holding an opinion. Only ever grows during a run.
    active: Vec<usize>,
    
    idea_count: usize,
    anti_idea_count: usize,
    
    /// First message index at which all nodes agreed
    convergence_time: Option<u64>,
    
    /// Emit a trace event every N messages
    trace_interval: Option<u64>,
}

impl InfectionModel {
    /// Creates an engine from any graph provider.
    ///
    /// Fails if node labels are not exactly `0..N`.
    pub fn new<G: GraphProvider + ?Sized>(
        graph: &G,
        params: RateParams,
        seed: u64,
    ) -> Result<Self, CoreError> {
        let adjacency = Adjacency::from_provider(graph)?;
        Ok(Self::from_adjacency(Arc::new(adjacency), params, seed))
    }
    
    /// Creates an engine over an already validated topology.
    pub fn from_adjacency(adjacency: Arc<Adjacency>, params: RateParams, seed: u64) -> Self {
        Self {
            adjacency,
            params,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            states: StateVector::default(),
            active: Vec::new(),
            idea_count: 0,
            anti_idea_count: 0,
            convergence_time: None,
            trace_interval: None,
        }
    }
    
    /// Logs progress every `interval` messages at TRACE level (0 disables).
    pub fn with_trace_interval(mut self, interval: u64) -> Self {
        self.trace_interval = (interval > 0).then_some(interval);
        self
    }
    
    /// Returns a fresh engine on the same topology and parameters.
    ///
    /// The fork has its own RNG seeded from `seed` and no state.
    pub fn fork(&self, seed: u64) -> Self {
        Self {
            trace_interval: self.trace_interval,
            ..Self::from_adjacency(Arc::clone(&self.adjacency), self.params, seed)
        }
    }
    
    /// Runs up to `n_messages` message events starting from `initial_state`.
    ///
    /// Any state left over from a previous run is discarded. The run stops
    /// right after the first message that leaves every node on the same
    /// opinion; that message index becomes the convergence time.
    pub fn run(
        &mut self,
        n_messages: u64,
        initial_state: &StateVector,
    ) -> Result<RunRecord, CoreError> {
        let node_count = self.adjacency.node_count();
        if initial_state.len() != node_count {
            return Err(CoreError::StateLengthMismatch {
                expected: node_count,
                actual: initial_state.len(),
            });
        }
        if initial_state.active_count() == 0 {
            return Err(CoreError::NoActiveNodes);
        }
        
        self.reset(initial_state);
        
        let mut pending = Vec::new();
        let mut processed = 0;
        
        for t in 0..n_messages {
            let seed = self.pick_seed()?;
            self.infect_neighbors(seed, &mut pending);
            processed = t + 1;
            
            if let Some(interval) = self.trace_interval {
                if t % interval == 0 {
                    trace!(
                        t,
                        seed,
                        idea = self.idea_count,
                        anti_idea = self.anti_idea_count,
                        "message processed"
                    );
                }
            }
            
            if self.is_converged() {
                debug!(t, idea = self.idea_count, "all nodes agree");
                self.convergence_time = Some(t);
                break;
            }
        }
        
        Ok(RunRecord {
            final_state: self.states.clone(),
            convergence_time: self.convergence_time,
            messages_processed: processed,
        })
    }
    
    /// Returns the number of nodes currently holding the idea.
    pub fn reward(&self) -> usize {
        self.idea_count
    }
    
    /// Returns the current state vector.
    pub fn states(&self) -> &StateVector {
        &self.states
    }
    
    /// Returns the convergence time of the last run.
    pub fn convergence_time(&self) -> Option<u64> {
        self.convergence_time
    }
    
    /// Returns the model parameters.
    pub fn params(&self) -> RateParams {
        self.params
    }
    
    /// Returns the seed the RNG was initialized from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
    
    /// Returns the TRACE progress interval, if enabled.
    pub fn trace_interval(&self) -> Option<u64> {
        self.trace_interval
    }
    
    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.node_count()
    }
    
    fn reset(&mut self, initial_state: &StateVector) {
        self.states = initial_state.clone();
        self.active.clear();
        self.active.extend(
            initial_state
                .as_slice()
                .iter()
                .enumerate()
                .filter(|(_, o)| o.is_active())
                .map(|(node, _)| node),
        );
        self.idea_count = initial_state.count(Opinion::Idea);
        self.anti_idea_count = initial_state.count(Opinion::AntiIdea);
        self.convergence_time = None;
    }
    
    fn pick_seed(&mut self) -> Result<usize, CoreError> {
        self.active
            .choose(&mut self.rng)
            .copied()
            .ok_or(CoreError::NoActiveNodes)
    }
    
    /// One message event from `seed` to all of its out-neighbors.
    ///
    /// Transitions are decided against the pre-event states and only then
    /// written back.
    fn infect_neighbors(&mut self, seed: usize, pending: &mut Vec<(usize, Opinion)>) {
        let infection = self.states[seed];
        let opposing = infection.opposite();
        pending.clear();
        
        for &neighbor in self.adjacency.neighbors(seed) {
            let current = self.states[neighbor];
            let probability = if current == Opinion::Indifferent {
                self.params.lambda()
            } else if current == opposing {
                self.params.mu()
            } else {
                continue;
            };
            
            if bernoulli(&mut self.rng, probability) {
                pending.push((neighbor, infection));
            }
        }
        
        for &(node, opinion) in pending.iter() {
            self.apply(node, opinion);
        }
    }
    
    fn apply(&mut self, node: usize, opinion: Opinion) {
        match self.states.replace(node, opinion) {
            Opinion::Indifferent => self.active.push(node),
            Opinion::Idea => self.idea_count -= 1,
            Opinion::AntiIdea => self.anti_idea_count -= 1,
        }
        match opinion {
            Opinion::Idea => self.idea_count += 1,
            Opinion::AntiIdea => self.anti_idea_count += 1,
            Opinion::Indifferent => {}
        }
    }
    
    fn is_converged(&self) -> bool {
        let n = self.states.len();
        self.idea_count == n || self.anti_idea_count == n
    }
}

/// Uniform draw on `[0, 1)` compared against `p` with `<=`.
///
/// `p == 0` never fires.
fn bernoulli<R: Rng>(rng: &mut R, p: f64) -> bool {
    p > 0.0 && rng.gen::<f64>() <= p
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graphmap::DiGraphMap;
    use proptest::prelude::*;
    
    fn cycle(n: usize) -> DiGraphMap<usize, ()> {
        DiGraphMap::from_edges((0..n).map(|i| (i, (i + 1) % n)))
    }
    
    fn single_node() -> DiGraphMap<usize, ()> {
        let mut graph = DiGraphMap::new();
        graph.add_node(0);
        graph
    }
    
    fn state(values: &[i8]) -> StateVector {
        StateVector::from_values(values).unwrap()
    }
    
    #[test]
    fn test_rejects_non_contiguous_labels() {
        let graph: DiGraphMap<usize, ()> = DiGraphMap::from_edges([(0, 2)]);
        let params = RateParams::new(0.5, 0.5).unwrap();
        
        assert!(matches!(
            InfectionModel::new(&graph, params, 1),
            Err(CoreError::Graph(_))
        ));
    }
    
    #[test]
    fn test_rejects_state_without_active_node() {
        let params = RateParams::new(0.5, 0.5).unwrap();
        let mut model = InfectionModel::new(&cycle(3), params, 1).unwrap();
        
        assert_eq!(model.run(10, &state(&[0, 0, 0])), Err(CoreError::NoActiveNodes));
    }
    
    #[test]
    fn test_rejects_state_length_mismatch() {
        let params = RateParams::new(0.5, 0.5).unwrap();
        let mut model = InfectionModel::new(&cycle(3), params, 1).unwrap();
        
        assert_eq!(
            model.run(10, &state(&[1, 0])),
            Err(CoreError::StateLengthMismatch { expected: 3, actual: 2 })
        );
    }
    
    #[test]
    fn test_zero_messages_is_identity() {
        let params = RateParams::new(1.0, 1.0).unwrap();
        let mut model = InfectionModel::new(&cycle(4), params, 7).unwrap();
        let init = state(&[1, -1, 0, 0]);
        
        let record = model.run(0, &init).unwrap();
        
        assert_eq!(record.final_state, init);
        assert_eq!(record.convergence_time, None);
        assert_eq!(record.messages_processed, 0);
    }
    
    #[test]
    fn test_single_node_converges_immediately() {
        for (lambda, mu) in [(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)] {
            let params = RateParams::new(lambda, mu).unwrap();
            let mut model = InfectionModel::new(&single_node(), params, 3).unwrap();
            
            let record = model.run(100, &state(&[1])).unwrap();
            
            assert_eq!(record.convergence_time, Some(0));
            assert_eq!(record.messages_processed, 1);
            assert_eq!(model.reward(), 1);
        }
    }
    
    #[test]
    fn test_cycle_without_conversion_never_converges() {
        // Node 1 holds the anti-idea and mu = 0 keeps it there forever
        let params = RateParams::new(1.0, 0.0).unwrap();
        
        for seed in 0..20 {
            let mut model = InfectionModel::new(&cycle(4), params, seed).unwrap();
            let record = model.run(10, &state(&[1, -1, 0, 0])).unwrap();
            
            assert_eq!(record.convergence_time, None);
            assert_eq!(record.messages_processed, 10);
            assert_eq!(record.final_state[1], Opinion::AntiIdea);
            assert_eq!(record.final_state[0], Opinion::Idea);
        }
    }
    
    #[test]
    fn test_full_rates_flood_fill_reachable_nodes() {
        // 0 -> 1 -> 0, node 2 unreachable
        let adjacency = Adjacency::from_lists(&[vec![1], vec![0], vec![]]).unwrap();
        let params = RateParams::new(1.0, 1.0).unwrap();
        let mut model = InfectionModel::from_adjacency(Arc::new(adjacency), params, 11);
        
        let record = model.run(50, &state(&[1, 0, 0])).unwrap();
        
        assert_eq!(record.final_state, state(&[1, 1, 0]));
        assert_eq!(record.convergence_time, None);
    }
    
    #[test]
    fn test_full_rates_adopt_on_first_contact() {
        // Star from the single active hub: one message reaches everybody
        let graph: DiGraphMap<usize, ()> = DiGraphMap::from_edges([(0, 1), (0, 2), (0, 3)]);
        let params = RateParams::new(1.0, 1.0).unwrap();
        let mut model = InfectionModel::new(&graph, params, 5).unwrap();
        
        let record = model.run(10, &state(&[-1, 0, 0, 0])).unwrap();
        
        assert_eq!(record.convergence_time, Some(0));
        assert_eq!(record.winner(), Some(Opinion::AntiIdea));
        assert_eq!(model.reward(), 0);
    }
    
    #[test]
    fn test_full_conversion_on_contact() {
        let graph: DiGraphMap<usize, ()> = DiGraphMap::from_edges([(0, 1)]);
        let params = RateParams::new(0.0, 1.0).unwrap();
        let mut model = InfectionModel::new(&graph, params, 5).unwrap();
        
        // Seed 1 has no out-edges, seed 0 converts node 1
        let record = model.run(100, &state(&[1, -1])).unwrap();
        
        assert!(record.converged());
        assert_eq!(record.winner(), Some(Opinion::Idea));
        assert_eq!(model.reward(), 2);
    }
    
    #[test]
    fn test_rerun_discards_previous_state() {
        let params = RateParams::new(1.0, 1.0).unwrap();
        let mut model = InfectionModel::new(&cycle(3), params, 9).unwrap();
        
        let first = model.run(100, &state(&[1, 0, 0])).unwrap();
        assert_eq!(first.winner(), Some(Opinion::Idea));
        
        let second = model.run(0, &state(&[-1, 0, 0])).unwrap();
        assert_eq!(second.final_state, state(&[-1, 0, 0]));
        assert_eq!(model.convergence_time(), None);
        assert_eq!(model.reward(), 0);
    }
    
    #[test]
    fn test_same_seed_same_run() {
        let params = RateParams::new(0.4, 0.3).unwrap();
        let init = state(&[1, -1, 0, 0, 0, 0, 0, 0]);
        
        let mut a = InfectionModel::new(&cycle(8), params, 1234).unwrap();
        let mut b = a.fork(1234);
        
        assert_eq!(a.run(500, &init).unwrap(), b.run(500, &init).unwrap());
    }
    
    fn arb_case() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<i8>)> {
        (1usize..8)
            .prop_flat_map(|n| {
                (
                    prop::collection::vec(prop::collection::vec(0..n, 0..n), n),
                    prop::collection::vec(-1i8..=1, n),
                )
            })
            .prop_filter("needs an active node", |(_, values)| {
                values.iter().any(|&v| v != 0)
            })
    }
    
    proptest! {
        #[test]
        fn prop_states_stay_in_domain(
            (lists, values) in arb_case(),
            lambda in 0.0f64..=1.0,
            mu in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let adjacency = Arc::new(Adjacency::from_lists(&lists).unwrap());
            let params = RateParams::new(lambda, mu).unwrap();
            let mut model = InfectionModel::from_adjacency(adjacency, params, seed);
            
            let record = model.run(200, &state(&values)).unwrap();
            
            prop_assert!(record.final_state.to_values().iter().all(|v| (-1..=1).contains(v)));
            prop_assert_eq!(record.reward(), model.reward());
            // Indifferent nodes never come back
            prop_assert!(record.final_state.active_count() >= state(&values).active_count());
        }
        
        #[test]
        fn prop_convergence_time_is_first_agreement(
            (lists, values) in arb_case(),
            lambda in 0.0f64..=1.0,
            mu in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let adjacency = Arc::new(Adjacency::from_lists(&lists).unwrap());
            let params = RateParams::new(lambda, mu).unwrap();
            let init = state(&values);
            
            let mut model = InfectionModel::from_adjacency(adjacency, params, seed);
            let record = model.run(200, &init).unwrap();
            
            if let Some(t) = record.convergence_time {
                prop_assert!(record.final_state.consensus().is_some());
                prop_assert_eq!(record.messages_processed, t + 1);
                
                // Replaying the same stream one message short must not agree yet
                if t > 0 {
                    let short = model.fork(seed).run(t, &init).unwrap();
                    prop_assert_eq!(short.convergence_time, None);
                    prop_assert!(short.final_state.consensus().is_none());
                }
            } else {
                prop_assert_eq!(record.messages_processed, 200);
                prop_assert!(record.final_state.consensus().is_none());
            }
        }
        
        #[test]
        fn prop_zero_rates_freeze_state(
            (lists, values) in arb_case(),
            seed in any::<u64>(),
        ) {
            let adjacency = Arc::new(Adjacency::from_lists(&lists).unwrap());
            let params = RateParams::new(0.0, 0.0).unwrap();
            let init = state(&values);
            
            let mut model = InfectionModel::from_adjacency(adjacency, params, seed);
            let record = model.run(50, &init).unwrap();
            
            prop_assert_eq!(&record.final_state, &init);
            if init.consensus().is_some() {
                prop_assert_eq!(record.convergence_time, Some(0));
            } else {
                prop_assert_eq!(record.convergence_time, None);
            }
        }
    }
}
