use clap::{Args, Parser, Subcommand};
use symposium_core::OwnershipPlan;
use symposium_testing::SchedulerKind;

mod error;
mod live;
mod sim;

use error::CliError;
use live::run_ring;
use sim::{run_explore, run_simulation};

#[derive(Parser, Debug)]
#[command(name = "symposium", version = "0.1.0")]
#[command(about = "Symposium CLI - dining philosophers over capacity-1 channels")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seat a live ring on the tokio runtime
    Run(RunArgs),
    /// Step the ring model under a scheduler
    Simulate(SimulateArgs),
    /// Search every interleaving of a small ring for deadlocks
    Explore(ExploreArgs),
}

/// Flags override SYMPOSIUM_* environment variables
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of philosophers
    #[arg(long)]
    pub seats: Option<usize>,
    /// Eating pause in milliseconds
    #[arg(long)]
    pub eat_ms: Option<u64>,
    /// Thinking pause in milliseconds
    #[arg(long)]
    pub think_ms: Option<u64>,
    /// Initial fork placement (reversed-last, uniform)
    #[arg(long)]
    pub plan: Option<OwnershipPlan>,
    /// Stop once every philosopher has eaten this many times
    #[arg(long)]
    pub meals: Option<u64>,
    /// Do not log per-transition trace lines
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 5)]
    pub seats: usize,
    /// Step budget
    #[arg(long, default_value_t = 10_000)]
    pub steps: u64,
    /// Scheduler (round-robin, random, lockstep)
    #[arg(long, default_value_t = SchedulerKind::RoundRobin)]
    pub scheduler: SchedulerKind,
    /// Seed for the random scheduler
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    #[arg(long, default_value_t = OwnershipPlan::ReversedLast)]
    pub plan: OwnershipPlan,
    /// Log every transition
    #[arg(long)]
    pub trace: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExploreArgs {
    #[arg(long, default_value_t = 3)]
    pub seats: usize,
    #[arg(long, default_value_t = OwnershipPlan::ReversedLast)]
    pub plan: OwnershipPlan,
    /// Longest schedule to examine
    #[arg(long, default_value_t = 512)]
    pub depth: usize,
    /// Stop after visiting this many states
    #[arg(long, default_value_t = 1_000_000)]
    pub max_states: usize,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let result: Result<(), CliError> = match cli.command {
        Commands::Run(args) => run_ring(args).await,
        Commands::Simulate(args) => run_simulation(args),
        Commands::Explore(args) => run_explore(args),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}
