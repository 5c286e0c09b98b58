//! Batch simulator
//!
//! Rounds are independent: each owns its state, random stream, wallet and
//! book, and its stream is derived from `(seed, round id)`. Rounds run on a
//! rayon pool and are collected in round order, so the same settings give
//! the same report whatever the thread count.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rf_slot_math::{
    Book, GameConfig, LedgerWallet, ResultSet, RoundContext, RoundEngine, RoundState, RoundWin, SeededRng,
};

use crate::criteria::assign_criteria;
use crate::error::{Result, SimError};
use crate::report::SimulationReport;

// ═══════════════════════════════════════════════════════════════════════════════
// SETTINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// What to do with a round whose result set never accepts it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaPolicy {
    /// Fail the run with [`SimError::CriteriaNotMet`]
    #[default]
    Strict,
    /// Keep the last attempt and count it as unmet
    BestEffort,
}

/// Simulation run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Rounds to simulate
    pub rounds: u64,

    /// Base seed; round streams are derived from it
    pub seed: u64,

    /// Worker threads
    pub threads: usize,

    /// Replays of one round before its criteria gives up
    pub max_criteria_attempts: u32,

    pub policy: CriteriaPolicy,

    /// Keep every round's book in the output
    pub keep_books: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 10_000,
            seed: 0,
            threads: num_cpus::get(),
            max_criteria_attempts: 1_000,
            policy: CriteriaPolicy::Strict,
            keep_books: false,
        }
    }
}

impl SimulationConfig {
    /// Small best-effort run for smoke tests
    pub fn quick() -> Self {
        Self {
            rounds: 1_000,
            max_criteria_attempts: 200,
            policy: CriteriaPolicy::BestEffort,
            ..Default::default()
        }
    }

    /// Full-size run for RTP measurement
    pub fn full() -> Self {
        Self {
            rounds: 1_000_000,
            max_criteria_attempts: 10_000,
            ..Default::default()
        }
    }

    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_policy(mut self, policy: CriteriaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_books(mut self, keep: bool) -> Self {
        self.keep_books = keep;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(SimError::Settings("rounds must be positive".into()));
        }
        if self.max_criteria_attempts == 0 {
            return Err(SimError::Settings("max_criteria_attempts must be positive".into()));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN
// ═══════════════════════════════════════════════════════════════════════════════

/// One simulated round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: u64,
    pub criteria: String,
    /// Capped, rounded win of the accepted attempt
    pub win: RoundWin,
    pub criteria_met: bool,
    /// Plays until acceptance, including the accepted one
    pub attempts: u32,
    /// Free spins awarded over the round
    pub free_spins: u32,
    pub book: Option<Book>,
}

/// Result of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub report: SimulationReport,
    /// Rounds in id order
    pub records: Vec<RoundRecord>,
}

impl SimulationOutput {
    /// Write kept books as JSON lines, in round order
    pub fn write_books(&self, path: &Path) -> Result<usize> {
        let mut out = BufWriter::new(File::create(path)?);
        let mut written = 0;
        for book in self.records.iter().filter_map(|r| r.book.as_ref()) {
            serde_json::to_writer(&mut out, book)?;
            out.write_all(b"\n")?;
            written += 1;
        }
        out.flush()?;
        log::info!("wrote {} books to {}", written, path.display());
        Ok(written)
    }
}

/// Runs many rounds of one game
pub struct Simulator<'a> {
    game: &'a GameConfig,
    settings: SimulationConfig,
}

impl<'a> Simulator<'a> {
    pub fn new(game: &'a GameConfig, settings: SimulationConfig) -> Self {
        Self { game, settings }
    }

    pub fn settings(&self) -> &SimulationConfig {
        &self.settings
    }

    /// Simulate `settings.rounds` rounds of `mode`
    pub fn run(&self, mode: &str) -> Result<SimulationOutput> {
        self.settings.validate()?;
        let engine = RoundEngine::new(self.game, mode)?;
        let result_sets = &engine.mode().result_sets;
        let assignment = assign_criteria(result_sets, self.settings.rounds, self.settings.seed)?;

        log::info!(
            "simulating {} rounds of {}/{} on {} threads (seed {})",
            self.settings.rounds,
            self.game.id,
            mode,
            self.settings.threads,
            self.settings.seed
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.threads.max(1))
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let records = pool.install(|| {
            assignment
                .par_iter()
                .enumerate()
                .map(|(id, &idx)| self.play_round(&engine, &result_sets[idx], id as u64))
                .collect::<Result<Vec<_>>>()
        })?;

        let report = SimulationReport::from_records(
            &self.game.id,
            mode,
            self.settings.seed,
            engine.mode().cost,
            &records,
        );
        log::info!(
            "{}/{}: rtp {:.4}, hit rate {:.4}, max win {:.2}",
            self.game.id,
            mode,
            report.rtp,
            report.hit_rate,
            report.max_win
        );

        Ok(SimulationOutput { report, records })
    }

    /// Play round `id` until its result set accepts it.
    ///
    /// Replays continue the round's stream with a fresh state, wallet and book.
    pub fn play_round(&self, engine: &RoundEngine<'_>, result_set: &ResultSet, id: u64) -> Result<RoundRecord> {
        let mut rng = SeededRng::for_round(self.settings.seed, id);
        let max_attempts = self.settings.max_criteria_attempts;
        let mut last = None;

        for attempt in 1..=max_attempts {
            let mut state = RoundState::new();
            let mut wallet = LedgerWallet::new();
            let mut book = Book::new(id, result_set.criteria.clone());

            let outcome = engine.play_round(&mut RoundContext {
                state: &mut state,
                rng: &mut rng,
                wallet: &mut wallet,
                book: &mut book,
                result_set,
            })?;

            let win = wallet.confirm_round(self.game.max_win_x)?;
            book.finalize(&win);
            let met = result_set.meets_criteria(&outcome.final_state, win.total, self.game.max_win_x);

            let record = RoundRecord {
                id,
                criteria: result_set.criteria.clone(),
                win,
                criteria_met: met,
                attempts: attempt,
                free_spins: outcome.final_state.total_free_spins,
                book: self.settings.keep_books.then_some(book),
            };
            if met {
                return Ok(record);
            }
            if max_attempts >= 10 && attempt == max_attempts / 10 {
                log::warn!(
                    "round {} still misses '{}' after {} of {} attempts",
                    id,
                    result_set.criteria,
                    attempt,
                    max_attempts
                );
            }
            last = Some(record);
        }

        match (self.settings.policy, last) {
            (CriteriaPolicy::BestEffort, Some(record)) => {
                log::warn!(
                    "round {} kept without meeting '{}' after {} attempts",
                    id,
                    result_set.criteria,
                    max_attempts
                );
                Ok(record)
            }
            _ => Err(SimError::CriteriaNotMet {
                criteria: result_set.criteria.clone(),
                round: id,
                attempts: max_attempts,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let quick = SimulationConfig::quick();
        assert_eq!(quick.policy, CriteriaPolicy::BestEffort);
        assert!(quick.rounds < SimulationConfig::default().rounds);
        assert!(SimulationConfig::full().rounds > SimulationConfig::default().rounds);
        assert!(SimulationConfig::default().threads >= 1);
    }

    #[test]
    fn test_builders() {
        let cfg = SimulationConfig::default()
            .with_rounds(5)
            .with_seed(9)
            .with_threads(0)
            .with_books(true);
        assert_eq!(cfg.rounds, 5);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.threads, 1);
        assert!(cfg.keep_books);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(SimulationConfig::default().with_rounds(0).validate().is_err());
        let cfg = SimulationConfig {
            max_criteria_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::Settings(_))));
    }
}
