//! slot-sim: batch simulation of a game definition
//!
//! Usage:
//!   slot-sim --config games/lines_example.yaml --mode base --rounds 100000
//!   slot-sim --config game.json --mode bonus --books books.jsonl --report report.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rf_slot_math::GameConfig;
use rf_slot_sim::{CriteriaPolicy, SimulationConfig, Simulator};

#[derive(Parser)]
#[command(name = "slot-sim", about = "Seeded batch simulation of slot rounds")]
struct Cli {
    /// Game definition (.yaml, .yml or .json)
    #[arg(short, long)]
    config: PathBuf,

    /// Game mode to simulate
    #[arg(short, long, default_value = "base")]
    mode: String,

    /// Number of rounds
    #[arg(short, long, default_value_t = 10_000)]
    rounds: u64,

    /// Base seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (defaults to all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Write every round's book as JSON lines
    #[arg(long)]
    books: Option<PathBuf>,

    /// Write the report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Replays per round before its criteria gives up
    #[arg(long)]
    max_criteria_attempts: Option<u32>,

    /// Keep rounds whose criteria is never met instead of failing
    #[arg(long)]
    best_effort: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let game = GameConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    log::info!("loaded game {} ({} modes)", game.id, game.modes.len());

    let mut settings = SimulationConfig::default()
        .with_rounds(cli.rounds)
        .with_seed(cli.seed)
        .with_books(cli.books.is_some());
    if let Some(threads) = cli.threads {
        settings = settings.with_threads(threads);
    }
    if let Some(attempts) = cli.max_criteria_attempts {
        settings.max_criteria_attempts = attempts;
    }
    if cli.best_effort {
        settings = settings.with_policy(CriteriaPolicy::BestEffort);
    }

    let output = Simulator::new(&game, settings)
        .run(&cli.mode)
        .with_context(|| format!("simulating mode {}", cli.mode))?;

    if let Some(path) = &cli.books {
        output
            .write_books(path)
            .with_context(|| format!("writing books to {}", path.display()))?;
    }
    if let Some(path) = &cli.report {
        output
            .report
            .save(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    println!("{}", output.report.to_json()?);
    eprintln!("{}", output.report.to_text());
    Ok(())
}
