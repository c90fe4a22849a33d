//! Learn action values for a grid world from the command line
//!
//! ```text
//! cargo run --example grid_world_learn -- learn
//! cargo run --example grid_world_learn -- learn "   +| # -|    " --episodes 500 --seed 7 --quiet
//! ```
//!
//! One exploratory episode is shown step by step, a batch of further episodes follows, and the
//! learned table is printed at the end. Set `RUST_LOG=qgrid=debug` to follow every episode.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use qgrid::{
    algo::{EpisodeReport, QTableAgent, QTableAgentConfig},
    env::{grid::DEFAULT_LAYOUT, Grid},
};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_world_learn")]
#[command(about = "Tabular Q-learning in a small grid world", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore the grid at random and print the learned action values
    Learn(LearnArgs),
}

#[derive(Args)]
struct LearnArgs {
    /// Rows of the grid separated by '|': ' ' free, '#' wall, '+' goal, '-' penalty
    #[arg(default_value = DEFAULT_LAYOUT)]
    layout: String,

    /// Episodes to run after the exploratory one
    #[arg(short, long, default_value_t = 100)]
    episodes: u32,

    /// Seed for the random number generator, drawn from the OS if omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Learning rate
    #[arg(long, default_value_t = QTableAgentConfig::default().alpha)]
    alpha: f32,

    /// Discount factor
    #[arg(long, default_value_t = QTableAgentConfig::default().gamma)]
    gamma: f32,

    /// Most steps an episode may take
    #[arg(long, default_value_t = QTableAgentConfig::default().max_steps)]
    max_steps: u32,

    /// Write per-episode statistics of the batch to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Skip the step by step display of the exploratory episode
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qgrid=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn learn(args: LearnArgs) -> Result<()> {
    let grid = Grid::parse(&args.layout)?;
    let config = QTableAgentConfig {
        alpha: args.alpha,
        gamma: args.gamma,
        max_steps: args.max_steps,
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut agent = QTableAgent::new(&grid, config, rng);

    let quiet = args.quiet;
    agent.learn_episode_observed(|state| {
        if !quiet {
            println!("{state}");
        }
    })?;

    let reports = agent.learn(args.episodes)?;
    if let Some(path) = &args.csv {
        write_reports(path, &reports)?;
    }

    println!("{}", agent.get_q_table());
    Ok(())
}

fn write_reports(path: &Path, reports: &[EpisodeReport]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["episode", "start_x", "start_y", "steps", "reward", "end"])?;
    for (i, report) in reports.iter().enumerate() {
        wtr.write_record(&[
            i.to_string(),
            report.start.0.to_string(),
            report.start.1.to_string(),
            report.steps.to_string(),
            report.reward.to_string(),
            format!("{:?}", report.end),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Learn(args) => learn(args),
    }
}
