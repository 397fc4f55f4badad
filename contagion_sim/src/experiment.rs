//! Monte Carlo driver.
//!
//! Every trial gets a private engine forked from a template (shared
//! topology, private state and RNG), so trials can fan out over `rayon`
//! without synchronization. Trial `i` always draws from
//! [`SeedProvider::trial_seed(i)`](crate::SeedProvider::trial_seed), which
//! makes results independent of thread count and scheduling. Statistics
//! are only reduced after every trial has finished.

use crate::seeds::SeedProvider;
use crate::SimError;
use contagion_core::{CoreError, InfectionModel, Opinion, RateParams, StateVector};
use contagion_env::GraphProvider;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How trials are seeded and scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPlan {
    /// Seed source for trial streams
    pub seeds: SeedProvider,
    
    /// Fan trials out over the rayon pool
    pub parallel: bool,
    
    /// TRACE progress of every trial each N messages (0 = off)
    pub trace_interval: u64,
}

impl TrialPlan {
    /// Parallel plan from a master seed.
    pub fn new(master_seed: u64) -> Self {
        Self {
            seeds: SeedProvider::new(master_seed),
            parallel: true,
            trace_interval: 0,
        }
    }
    
    /// Same seeds, one trial after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
    
    /// Plan for sweep cell `cell`, keeping the scheduling mode.
    pub fn for_cell(&self, cell: u64) -> Self {
        Self {
            seeds: self.seeds.for_cell(cell),
            ..*self
        }
    }
    
    /// Trial engine forked from `template` with this plan's tracing.
    pub fn engine(&self, template: &InfectionModel, seed: u64) -> InfectionModel {
        template.fork(seed).with_trace_interval(self.trace_interval)
    }
    
    /// Runs `n_trials` closures, each handed its trial seed, and collects
    /// the outcomes in trial order.
    pub(crate) fn run_trials<T, F>(&self, n_trials: usize, trial: F) -> Result<Vec<T>, CoreError>
    where
        T: Send,
        F: Fn(usize, u64) -> Result<T, CoreError> + Sync,
    {
        let seeds = self.seeds;
        let run = |i: usize| trial(i, seeds.trial_seed(i as u64));
        
        if self.parallel {
            (0..n_trials).into_par_iter().map(run).collect()
        } else {
            (0..n_trials).map(run).collect()
        }
    }
}

/// Builds an initial state from seed proportions.
///
/// `floor(n * p_minus)` anti-idea nodes come first, then
/// `floor(n * p_plus)` idea nodes, the rest indifferent.
pub fn make_init_state(n_nodes: usize, p_plus: f64, p_minus: f64) -> Result<StateVector, SimError> {
    check_proportion("p_plus", p_plus)?;
    check_proportion("p_minus", p_minus)?;
    if p_plus + p_minus > 1.0 {
        return Err(SimError::ProportionOverflow { p_plus, p_minus });
    }
    
    let n_plus = (n_nodes as f64 * p_plus).floor() as usize;
    let n_minus = (n_nodes as f64 * p_minus).floor() as usize;
    let n_indifferent = n_nodes.saturating_sub(n_plus + n_minus);
    
    let state = std::iter::repeat(Opinion::AntiIdea)
        .take(n_minus)
        .chain(std::iter::repeat(Opinion::Idea).take(n_plus))
        .chain(std::iter::repeat(Opinion::Indifferent).take(n_indifferent))
        .collect();
    Ok(state)
}

fn check_proportion(name: &'static str, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProportion { name, value })
    }
}

/// Convergence-time statistics over converged trials only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStats {
    /// Mean convergence time (message index) of converged trials
    pub mean_convergence_time: f64,
    
    /// Trials that reached full consensus within budget
    pub converged_trials: usize,
    
    /// All trials run
    pub total_trials: usize,
}

impl TimeStats {
    /// Reduces per-trial convergence times. Non-converged trials are
    /// excluded from the mean, not counted as zero.
    pub fn from_times(times: &[Option<u64>]) -> Result<Self, SimError> {
        let converged: Vec<u64> = times.iter().flatten().copied().collect();
        if converged.is_empty() {
            return Err(SimError::NoConvergedTrials { trials: times.len() });
        }
        
        let sum: f64 = converged.iter().map(|&t| t as f64).sum();
        Ok(Self {
            mean_convergence_time: sum / converged.len() as f64,
            converged_trials: converged.len(),
            total_trials: times.len(),
        })
    }
    
    /// Fraction of trials that converged.
    pub fn convergence_rate(&self) -> f64 {
        self.converged_trials as f64 / self.total_trials as f64
    }
}

/// Consensus outcome counts over a batch of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadStats {
    /// Trials ending with every node on the idea
    pub idea_wins: usize,
    
    /// Trials ending with every node on the anti-idea
    pub anti_idea_wins: usize,
    
    /// Trials ending without full consensus
    pub unresolved: usize,
    
    /// All trials run
    pub total_trials: usize,
}

impl SpreadStats {
    /// Tallies final-state winners.
    pub fn from_winners(winners: &[Option<Opinion>]) -> Self {
        let mut stats = Self {
            total_trials: winners.len(),
            ..Self::default()
        };
        for winner in winners {
            match winner {
                Some(Opinion::Idea) => stats.idea_wins += 1,
                Some(Opinion::AntiIdea) => stats.anti_idea_wins += 1,
                _ => stats.unresolved += 1,
            }
        }
        stats
    }
    
    /// Trials that reached full consensus on either side.
    pub fn consensus_trials(&self) -> usize {
        self.idea_wins + self.anti_idea_wins
    }
    
    /// P(idea wins | some full consensus), or `None` if no trial got there.
    pub fn idea_win_probability(&self) -> Option<f64> {
        let decided = self.consensus_trials();
        (decided > 0).then(|| self.idea_wins as f64 / decided as f64)
    }
    
    /// Like [`idea_win_probability`](Self::idea_win_probability) but
    /// surfaces the empty case as an error.
    pub fn require_idea_win_probability(&self) -> Result<f64, SimError> {
        self.idea_win_probability().ok_or(SimError::NoConsensus {
            trials: self.total_trials,
        })
    }
}

/// Runs `n_simulations` trials from the same initial state and returns the
/// mean convergence time of those that converged.
///
/// Fails with [`SimError::NoConvergedTrials`] if none did.
pub fn run_time_experiment<G: GraphProvider + ?Sized>(
    params: RateParams,
    graph: &G,
    init_state: &StateVector,
    n_simulations: usize,
    n_messages: u64,
    plan: &TrialPlan,
) -> Result<TimeStats, SimError> {
    let template = InfectionModel::new(graph, params, plan.seeds.master_seed())?;
    let times = convergence_times(&template, init_state, n_simulations, n_messages, plan)?;
    let stats = TimeStats::from_times(&times)?;
    
    info!(
        lambda = params.lambda(),
        mu = params.mu(),
        mean = stats.mean_convergence_time,
        converged = stats.converged_trials,
        trials = stats.total_trials,
        "time experiment finished"
    );
    Ok(stats)
}

/// Consensus tallies of a spread experiment and the win probability they
/// define.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadOutcome {
    pub stats: SpreadStats,
    
    /// idea_wins / (idea_wins + anti_idea_wins)
    pub idea_win_probability: f64,
}

/// Runs `n_simulations` trials from proportion-seeded initial states and
/// returns the consensus tallies with the idea win probability.
///
/// Fails with [`SimError::NoConsensus`] if no trial reached full consensus,
/// since the idea win probability would then be `0 / 0`.
pub fn run_full_spread_experiment(
    proportions: (f64, f64),
    model: &InfectionModel,
    n_simulations: usize,
    n_messages: u64,
    plan: &TrialPlan,
) -> Result<SpreadOutcome, SimError> {
    // Synthesis is deterministic, so one vector serves every trial
    let init_state = make_init_state(model.node_count(), proportions.0, proportions.1)?;
    let stats = spread_tally(&init_state, model, n_simulations, n_messages, plan)?;
    let probability = stats.require_idea_win_probability()?;
    
    info!(
        p_plus = proportions.0,
        p_minus = proportions.1,
        idea_wins = stats.idea_wins,
        anti_idea_wins = stats.anti_idea_wins,
        unresolved = stats.unresolved,
        probability,
        "full spread experiment finished"
    );
    Ok(SpreadOutcome {
        stats,
        idea_win_probability: probability,
    })
}

/// Per-trial convergence times, in trial order.
pub(crate) fn convergence_times(
    template: &InfectionModel,
    init_state: &StateVector,
    n_simulations: usize,
    n_messages: u64,
    plan: &TrialPlan,
) -> Result<Vec<Option<u64>>, CoreError> {
    plan.run_trials(n_simulations, |trial, seed| {
        let record = plan.engine(template, seed).run(n_messages, init_state)?;
        debug!(trial, seed, convergence_time = ?record.convergence_time, "trial finished");
        Ok(record.convergence_time)
    })
}

/// Tallies winners without requiring any consensus.
pub(crate) fn spread_tally(
    init_state: &StateVector,
    model: &InfectionModel,
    n_simulations: usize,
    n_messages: u64,
    plan: &TrialPlan,
) -> Result<SpreadStats, CoreError> {
    let winners = plan.run_trials(n_simulations, |trial, seed| {
        let record = plan.engine(model, seed).run(n_messages, init_state)?;
        let winner = record.winner();
        debug!(trial, seed, winner = ?winner, "trial finished");
        Ok(winner)
    })?;
    
    Ok(SpreadStats::from_winners(&winners))
}
