//! Constrained board generator
//!
//! Boards are produced by rejection sampling: draw a candidate, test it
//! against the predicate of the current [`DrawScenario`], retry. Retries are
//! bounded by [`GameConfig::max_draw_attempts`]; a configuration that cannot
//! satisfy its own predicate fails with
//! [`SlotError::UnsatisfiableConstraint`] instead of spinning forever.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::{GameConfig, GameMode};
use crate::error::{Result, SlotError};
use crate::reels::ReelSet;
use crate::result_set::ResultSet;
use crate::rng::RandomSource;
use crate::sampler::{pick_item, WeightTable};
use crate::state::{RoundState, SpinType};

/// Percentage roll at or below which a free-spin board tries the super trigger
pub const UPGRADE_ROLL_CUTOFF: f64 = 15.0;

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

/// Which validity predicate a board draw must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawScenario {
    /// Forced scatter placements from scatter or super-scatter stops,
    /// exactly one super scatter
    SuperTrigger,
    /// Forced scatter placements, no super scatter
    ForcedFreeSpins,
    /// Base-game board kept below the trigger threshold
    Unconstrained,
    /// Free-spin board that rolls for a super upgrade first
    UpgradeRoll,
    /// Any structurally valid board
    Open,
}

impl DrawScenario {
    /// Scenario for the next board of a round
    pub fn select(state: &RoundState, result_set: &ResultSet) -> Self {
        let base = state.spin_type == SpinType::BaseGame;
        let flags = &result_set.flags;

        if base && result_set.force_free_spins && flags.force_super_free_spins {
            Self::SuperTrigger
        } else if base && result_set.force_free_spins {
            Self::ForcedFreeSpins
        } else if base {
            Self::Unconstrained
        } else if flags.upgrade_free_spins && !state.flags.free_spins_upgraded_to_super {
            Self::UpgradeRoll
        } else {
            Self::Open
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperTrigger => "super_trigger",
            Self::ForcedFreeSpins => "forced_free_spins",
            Self::Unconstrained => "unconstrained",
            Self::UpgradeRoll => "upgrade_roll",
            Self::Open => "open",
        }
    }
}

impl std::fmt::Display for DrawScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage roll for a mid-session super upgrade
pub fn upgrade_roll(rng: &mut dyn RandomSource) -> bool {
    rng.random_float(1.0, 100.0).round() <= UPGRADE_ROLL_CUTOFF
}

// ═══════════════════════════════════════════════════════════════════════════════
// FORCED STOPS
// ═══════════════════════════════════════════════════════════════════════════════

/// Strip positions carrying `symbol`, per reel
pub fn reel_stops_for(reel_set: &ReelSet, symbol: u32) -> Vec<Vec<usize>> {
    reel_set.reels.iter().map(|strip| strip.stops_for(symbol)).collect()
}

/// Per-reel union of two stop lists
pub fn combine_stops(a: &[Vec<usize>], b: &[Vec<usize>]) -> Vec<Vec<usize>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let mut merged: Vec<usize> = x.iter().chain(y).copied().collect();
            merged.sort_unstable();
            merged.dedup();
            merged
        })
        .collect()
}

/// Choose `amount` distinct reels and one stop on each.
///
/// A reel's chance is the share of its strip covered by `stops`; once
/// chosen it drops out of the draw.
pub fn random_reel_stops(
    reel_set: &ReelSet,
    stops: &[Vec<usize>],
    amount: u8,
    rng: &mut dyn RandomSource,
) -> Result<BTreeMap<usize, usize>> {
    let mut weights: Vec<f64> = reel_set
        .reels
        .iter()
        .zip(stops)
        .map(|(strip, s)| {
            if strip.is_empty() {
                0.0
            } else {
                s.len() as f64 / strip.len() as f64
            }
        })
        .collect();

    let eligible = weights.iter().filter(|w| **w > 0.0).count();
    if eligible < amount as usize {
        return Err(SlotError::UnsatisfiableConstraint {
            scenario: format!(
                "{amount} forced reels on '{}' ({eligible} reels carry the symbol)",
                reel_set.id
            ),
            attempts: 0,
        });
    }

    let mut chosen = BTreeMap::new();
    while chosen.len() < amount as usize {
        let table = WeightTable::new("forced reels", weights.iter().copied().enumerate())?;
        let reel = *table.pick(rng)?;
        let stop = *pick_item(&stops[reel], rng).ok_or_else(|| SlotError::EmptyWeights("forced stops".into()))?;
        chosen.insert(reel, stop);
        weights[reel] = 0.0;
    }
    Ok(chosen)
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// A board that passed its scenario predicate
#[derive(Debug, Clone)]
pub struct DrawnBoard {
    pub board: Board,
    /// Scenario chosen for the draw
    pub scenario: DrawScenario,
    /// Scenario whose predicate the board satisfies; differs from
    /// `scenario` only after an upgrade roll
    pub resolved: DrawScenario,
    /// Clamped scatter count sampled for this draw
    pub scatter_target: u8,
    /// Candidates drawn, including the accepted one
    pub attempts: u32,
}

/// Draws valid boards for one game mode
#[derive(Debug, Clone, Copy)]
pub struct BoardGenerator<'a> {
    config: &'a GameConfig,
    mode: &'a GameMode,
    scatter: u32,
    super_scatter: u32,
}

impl<'a> BoardGenerator<'a> {
    pub fn new(config: &'a GameConfig, mode: &'a GameMode) -> Self {
        Self {
            config,
            mode,
            scatter: config.symbols.scatter(),
            super_scatter: config.symbols.super_scatter(),
        }
    }

    /// Draw the next board for `state` under `result_set`
    pub fn draw(
        &self,
        state: &RoundState,
        result_set: &ResultSet,
        rng: &mut dyn RandomSource,
    ) -> Result<DrawnBoard> {
        let reel_set = self.mode.reel_set(result_set.choose_reel_set(state, rng)?)?;

        let requested = self.config.scatter_weights.sample(&result_set.criteria, rng)?;
        let free_spins = &self.config.free_spins;
        let scatter_target = free_spins
            .clamp_scatter_count(state.spin_type, requested)
            .or_else(|_| free_spins.clamp_scatter_count(SpinType::BaseGame, requested))?;

        let scenario = DrawScenario::select(state, result_set);
        let resolved = match scenario {
            DrawScenario::UpgradeRoll if upgrade_roll(rng) => DrawScenario::SuperTrigger,
            DrawScenario::UpgradeRoll => DrawScenario::Open,
            other => other,
        };

        let (board, attempts) = match resolved {
            DrawScenario::SuperTrigger => self.draw_super_trigger(reel_set, scatter_target, rng)?,
            DrawScenario::ForcedFreeSpins => self.draw_forced_free_spins(reel_set, scatter_target, rng)?,
            DrawScenario::Unconstrained => {
                let cap = self.config.anticipation.threshold(state.spin_type) as usize;
                self.draw_unconstrained(reel_set, cap, rng)?
            }
            DrawScenario::Open | DrawScenario::UpgradeRoll => self.draw_open(reel_set, rng)?,
        };

        log::trace!(
            "{} board on '{}' after {} attempts (target {})",
            resolved,
            reel_set.id,
            attempts,
            scatter_target
        );

        Ok(DrawnBoard {
            board,
            scenario,
            resolved,
            scatter_target,
            attempts,
        })
    }

    fn draw_super_trigger(
        &self,
        reel_set: &ReelSet,
        target: u8,
        rng: &mut dyn RandomSource,
    ) -> Result<(Board, u32)> {
        let stops = combine_stops(
            &reel_stops_for(reel_set, self.scatter),
            &reel_stops_for(reel_set, self.super_scatter),
        );
        self.sample_until(DrawScenario::SuperTrigger, rng, |rng| {
            let forced = random_reel_stops(reel_set, &stops, target, rng)?;
            let board = self.candidate(reel_set, &forced, rng);
            let ok = board.count(self.super_scatter) == 1 && self.no_duplicates(&board);
            Ok(ok.then_some(board))
        })
    }

    fn draw_forced_free_spins(
        &self,
        reel_set: &ReelSet,
        target: u8,
        rng: &mut dyn RandomSource,
    ) -> Result<(Board, u32)> {
        let stops = reel_stops_for(reel_set, self.scatter);
        self.sample_until(DrawScenario::ForcedFreeSpins, rng, |rng| {
            let forced = random_reel_stops(reel_set, &stops, target, rng)?;
            let board = self.candidate(reel_set, &forced, rng);
            let ok = board.count(self.super_scatter) == 0
                && board.count(self.scatter) == target as usize
                && !board.has_duplicate_on_reel(self.scatter);
            Ok(ok.then_some(board))
        })
    }

    fn draw_unconstrained(
        &self,
        reel_set: &ReelSet,
        cap: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<(Board, u32)> {
        let free = BTreeMap::new();
        self.sample_until(DrawScenario::Unconstrained, rng, |rng| {
            let board = self.candidate(reel_set, &free, rng);
            let supers = board.count(self.super_scatter);
            let ok = board.count(self.scatter) + supers <= cap && supers <= 1 && self.no_duplicates(&board);
            Ok(ok.then_some(board))
        })
    }

    fn draw_open(&self, reel_set: &ReelSet, rng: &mut dyn RandomSource) -> Result<(Board, u32)> {
        let free = BTreeMap::new();
        self.sample_until(DrawScenario::Open, rng, |rng| {
            let board = self.candidate(reel_set, &free, rng);
            let ok = board.count(self.super_scatter) <= 1 && self.no_duplicates(&board);
            Ok(ok.then_some(board))
        })
    }

    fn candidate(&self, reel_set: &ReelSet, forced: &BTreeMap<usize, usize>, rng: &mut dyn RandomSource) -> Board {
        Board::draw(
            reel_set,
            self.config.grid.row_count(),
            self.config.pad_symbols,
            forced,
            rng,
        )
    }

    fn no_duplicates(&self, board: &Board) -> bool {
        !board.has_duplicate_on_reel(self.scatter) && !board.has_duplicate_on_reel(self.super_scatter)
    }

    fn sample_until<F>(&self, scenario: DrawScenario, rng: &mut dyn RandomSource, mut candidate: F) -> Result<(Board, u32)>
    where
        F: FnMut(&mut dyn RandomSource) -> Result<Option<Board>>,
    {
        let limit = self.config.max_draw_attempts;
        for attempt in 1..=limit {
            if let Some(board) = candidate(rng)? {
                return Ok((board, attempt));
            }
        }
        log::warn!(
            "{} draw on mode '{}' gave up after {} attempts",
            scenario,
            self.mode.name,
            limit
        );
        Err(SlotError::UnsatisfiableConstraint {
            scenario: scenario.to_string(),
            attempts: limit,
        })
    }
}
