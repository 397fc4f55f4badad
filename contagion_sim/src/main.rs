//! Contagion Simulator CLI
//!
//! Run Monte Carlo opinion-diffusion experiments and parameter sweeps.

use clap::{Args as ClapArgs, Parser, Subcommand};
use contagion_core::InfectionModel;
use contagion_sim::scenarios::ScenarioId;
use contagion_sim::{
    make_init_state, run_full_spread_experiment, run_time_experiment, sweep_proportions,
    sweep_rates, ExperimentExport, ExperimentResults, Grid, SimConfig, SimError, SpreadOutcome,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Competitive opinion diffusion experiments
#[derive(Parser, Debug)]
#[command(name = "contagion-sim")]
#[command(about = "Monte Carlo experiments for idea / anti-idea diffusion on directed graphs", long_about = None)]
struct Args {
    /// JSON configuration file (CLI flags override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, global = true)]
    seed: Option<u64>,
    
    /// Number of nodes in the synthetic topology
    #[arg(short, long, global = true)]
    nodes: Option<usize>,
    
    /// Topology (cycle, complete, star, path, random)
    #[arg(short = 'S', long, global = true)]
    scenario: Option<ScenarioId>,
    
    /// Edge-list file to use instead of a synthetic topology
    #[arg(long, global = true)]
    edges: Option<PathBuf>,
    
    /// Edge probability for the random topology
    #[arg(long, global = true)]
    edge_probability: Option<f64>,
    
    /// Trials per experiment or sweep cell
    #[arg(long, global = true)]
    simulations: Option<usize>,
    
    /// Message budget per trial
    #[arg(short, long, global = true)]
    messages: Option<u64>,
    
    /// Run trials on one thread (results are identical either way)
    #[arg(long, global = true)]
    sequential: bool,
    
    /// Log every Nth message of every trial at TRACE level
    #[arg(long, global = true)]
    trace_interval: Option<u64>,
    
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
    
    /// JSON output on stdout
    #[arg(long, global = true)]
    json: bool,
    
    /// Write results to a JSON file
    #[arg(long, global = true)]
    export: Option<PathBuf>,
    
    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct RateArgs {
    /// Adoption probability
    #[arg(long)]
    lambda: Option<f64>,
    
    /// Conversion probability
    #[arg(long)]
    mu: Option<f64>,
}

#[derive(ClapArgs, Debug)]
struct SeedingArgs {
    /// Share of nodes initially holding the idea
    #[arg(long)]
    p_plus: Option<f64>,
    
    /// Share of nodes initially holding the anti-idea
    #[arg(long)]
    p_minus: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mean convergence time at fixed rates
    Time {
        #[command(flatten)]
        rates: RateArgs,
        #[command(flatten)]
        seeding: SeedingArgs,
    },
    
    /// Probability that the idea wins full consensus
    Spread {
        #[command(flatten)]
        rates: RateArgs,
        #[command(flatten)]
        seeding: SeedingArgs,
    },
    
    /// Mean convergence time over a lambda x mu grid
    SweepRates {
        /// Lambda axis (comma-separated)
        #[arg(long, value_delimiter = ',')]
        lambdas: Option<Vec<f64>>,
        
        /// Mu axis (comma-separated)
        #[arg(long, value_delimiter = ',')]
        mus: Option<Vec<f64>>,
        
        #[command(flatten)]
        seeding: SeedingArgs,
    },
    
    /// Idea win probability over a p_plus x p_minus grid
    SweepProportions {
        /// Idea share axis (comma-separated)
        #[arg(long, value_delimiter = ',')]
        p_plus_values: Option<Vec<f64>>,
        
        /// Anti-idea share axis (comma-separated)
        #[arg(long, value_delimiter = ',')]
        p_minus_values: Option<Vec<f64>>,
        
        #[command(flatten)]
        rates: RateArgs,
    },
    
    /// List available topologies
    Scenarios,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Time { .. } => "time",
            Command::Spread { .. } => "spread",
            Command::SweepRates { .. } => "sweep-rates",
            Command::SweepProportions { .. } => "sweep-proportions",
            Command::Scenarios => "scenarios",
        }
    }
}

fn main() {
    let args = Args::parse();
    
    // Initialize logging (RUST_LOG wins over --verbose)
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    
    if let Err(e) = run(&args) {
        error!("{}", e);
        
        // Exit with proper code for scripts: 2 = nothing to aggregate
        let code = if e.is_empty_aggregate() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    if let Command::Scenarios = args.command {
        for scenario in ScenarioId::all() {
            println!("{:<10} {}", scenario.name(), scenario.description());
        }
        return Ok(());
    }
    
    let config = build_config(args)?;
    config.validate()?;
    
    let graph = config.load_graph()?;
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    
    if !args.json {
        info!("Contagion Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "{} | nodes={} edges={} seed={} trials={} budget={}",
            args.command.name(),
            node_count,
            edge_count,
            config.seed,
            config.n_simulations,
            config.n_messages
        );
    }
    
    let plan = config.plan();
    
    let results = match &args.command {
        Command::Time { .. } => {
            let init = make_init_state(node_count, config.p_plus, config.p_minus)?;
            let stats = run_time_experiment(
                config.rate_params()?,
                &graph,
                &init,
                config.n_simulations,
                config.n_messages,
                &plan,
            )?;
            
            if !args.json {
                info!(
                    "Mean convergence time {:.2} ({}/{} trials converged)",
                    stats.mean_convergence_time, stats.converged_trials, stats.total_trials
                );
            }
            ExperimentResults::Time { stats }
        }
        Command::Spread { .. } => {
            let model = InfectionModel::new(&graph, config.rate_params()?, config.seed)?;
            let SpreadOutcome {
                stats,
                idea_win_probability,
            } = run_full_spread_experiment(
                (config.p_plus, config.p_minus),
                &model,
                config.n_simulations,
                config.n_messages,
                &plan,
            )?;
            
            if !args.json {
                info!(
                    "Idea wins {:.3} of decided trials ({} idea / {} anti-idea / {} undecided)",
                    idea_win_probability, stats.idea_wins, stats.anti_idea_wins, stats.unresolved
                );
            }
            ExperimentResults::Spread {
                stats,
                idea_win_probability,
            }
        }
        Command::SweepRates { .. } => {
            let init = make_init_state(node_count, config.p_plus, config.p_minus)?;
            let cells = sweep_rates(
                &config.lambdas,
                &config.mus,
                &graph,
                &init,
                config.n_simulations,
                config.n_messages,
                &plan,
            )?;
            
            let empty = cells.iter().filter(|c| c.mean_convergence_time.is_none()).count();
            if empty > 0 {
                warn!("{}/{} cells never converged", empty, cells.len());
            }
            let grid = Grid::from_rate_cells(&cells);
            ExperimentResults::RateSweep { cells, grid }
        }
        Command::SweepProportions { .. } => {
            let model = InfectionModel::new(&graph, config.rate_params()?, config.seed)?;
            let pairs = config.proportion_pairs();
            let cells = sweep_proportions(&pairs, &model, config.n_simulations, config.n_messages, &plan)?;
            
            let empty = cells.iter().filter(|c| c.idea_win_probability.is_none()).count();
            if empty > 0 {
                warn!("{}/{} cells never reached consensus", empty, cells.len());
            }
            let grid = Grid::from_proportion_cells(&cells);
            ExperimentResults::ProportionSweep { cells, grid }
        }
        Command::Scenarios => return Ok(()),
    };
    
    let export = ExperimentExport::new(args.command.name(), node_count, edge_count, config, results);
    
    if args.json {
        println!("{}", export.to_json_pretty()?);
    }
    
    if let Some(path) = &args.export {
        export.write_to_file(path)?;
        if !args.json {
            info!("Exported results to {}", path.display());
        }
    }
    
    Ok(())
}

/// Defaults, then the config file, then CLI flags.
fn build_config(args: &Args) -> Result<SimConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if config.seed == 0 {
        config.seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
    }
    
    if let Some(nodes) = args.nodes {
        config.nodes = nodes;
    }
    if let Some(scenario) = args.scenario {
        config.scenario = scenario;
    }
    if let Some(edges) = &args.edges {
        config.edges_file = Some(edges.clone());
    }
    if let Some(p) = args.edge_probability {
        config.edge_probability = p;
    }
    if let Some(n) = args.simulations {
        config.n_simulations = n;
    }
    if let Some(n) = args.messages {
        config.n_messages = n;
    }
    if args.sequential {
        config.parallel = false;
    }
    if let Some(interval) = args.trace_interval {
        config.trace_interval = interval;
    }
    
    let (rates, seeding) = match &args.command {
        Command::Time { rates, seeding } | Command::Spread { rates, seeding } => {
            (Some(rates), Some(seeding))
        }
        Command::SweepRates { lambdas, mus, seeding } => {
            if let Some(lambdas) = lambdas {
                config.lambdas = lambdas.clone();
            }
            if let Some(mus) = mus {
                config.mus = mus.clone();
            }
            (None, Some(seeding))
        }
        Command::SweepProportions { p_plus_values, p_minus_values, rates } => {
            if let Some(values) = p_plus_values {
                config.p_plus_values = values.clone();
            }
            if let Some(values) = p_minus_values {
                config.p_minus_values = values.clone();
            }
            (Some(rates), None)
        }
        Command::Scenarios => (None, None),
    };
    
    if let Some(rates) = rates {
        if let Some(lambda) = rates.lambda {
            config.lambda = lambda;
        }
        if let Some(mu) = rates.mu {
            config.mu = mu;
        }
    }
    if let Some(seeding) = seeding {
        if let Some(p) = seeding.p_plus {
            config.p_plus = p;
        }
        if let Some(p) = seeding.p_minus {
            config.p_minus = p;
        }
    }
    
    Ok(config)
}
