//! Round engine: draws, evaluates and settles one play round
//!
//! A round is one base-game board plus, if it triggers, the complete
//! free-spin session. Everything the round touches outside the immutable
//! [`GameConfig`] is borrowed through a [`RoundContext`], so independent
//! rounds can run on separate threads with their own state, random stream,
//! wallet and book.

use serde::Serialize;
use serde_json::json;

use crate::anticipation::apply_anticipation;
use crate::board::Board;
use crate::bonus::{BonusStateMachine, Transition};
use crate::book::{events, OutcomeLog};
use crate::config::{GameConfig, GameMode};
use crate::error::{Result, SlotError};
use crate::generator::{BoardGenerator, DrawScenario};
use crate::paytable::LineEvaluation;
use crate::result_set::ResultSet;
use crate::rng::RandomSource;
use crate::state::{RoundState, SpinType};
use crate::wallet::Wallet;

/// Collaborators borrowed for one round
pub struct RoundContext<'a> {
    pub state: &'a mut RoundState,
    pub rng: &'a mut dyn RandomSource,
    pub wallet: &'a mut dyn Wallet,
    pub book: &'a mut dyn OutcomeLog,
    pub result_set: &'a ResultSet,
}

/// One played board
#[derive(Debug, Clone, Serialize)]
pub struct SpinRecord {
    pub spin_type: SpinType,
    pub scenario: DrawScenario,
    pub board: Board,
    pub wins: LineEvaluation,
}

impl SpinRecord {
    pub fn payout(&self) -> f64 {
        self.wins.total
    }
}

/// Everything a round produced
#[derive(Debug, Clone, Serialize)]
pub struct RoundOutcome {
    /// The base-game board and its wins
    pub base: SpinRecord,
    pub transition: Transition,
    /// Free-spin boards in play order
    pub free_spins: Vec<SpinRecord>,
    /// Confirmed round win before cap and rounding
    pub total_payout: f64,
    pub final_state: RoundState,
}

impl RoundOutcome {
    /// Board shown last
    pub fn final_board(&self) -> &Board {
        self.free_spins.last().map_or(&self.base.board, |s| &s.board)
    }

    pub fn base_payout(&self) -> f64 {
        self.base.payout()
    }

    pub fn free_spin_payout(&self) -> f64 {
        self.free_spins.iter().map(SpinRecord::payout).sum()
    }

    pub fn free_spin_iterations(&self) -> usize {
        self.free_spins.len()
    }
}

/// Plays rounds of one game mode
#[derive(Debug, Clone, Copy)]
pub struct RoundEngine<'a> {
    config: &'a GameConfig,
    mode: &'a GameMode,
    generator: BoardGenerator<'a>,
    bonus: BonusStateMachine<'a>,
    scatters: [u32; 2],
}

impl<'a> RoundEngine<'a> {
    pub fn new(config: &'a GameConfig, mode: &str) -> Result<Self> {
        let mode = config.mode(mode)?;
        Ok(Self {
            config,
            mode,
            generator: BoardGenerator::new(config, mode),
            bonus: BonusStateMachine::new(config),
            scatters: [config.symbols.scatter(), config.symbols.super_scatter()],
        })
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    pub fn mode(&self) -> &'a GameMode {
        self.mode
    }

    /// Play one round from a base-game state.
    ///
    /// Flags and totals left by a previous round are cleared first; the
    /// finished round's values stay readable in [`RoundOutcome::final_state`].
    pub fn play_round(&self, ctx: &mut RoundContext<'_>) -> Result<RoundOutcome> {
        if ctx.state.in_free_spins() || ctx.state.free_spin_amount > 0 {
            return Err(SlotError::Validation(
                "a round must start from the base game".into(),
            ));
        }
        ctx.state.reset();

        let base = self.play_spin(ctx)?;
        let transition = self.bonus.on_board(ctx.state, &base.board, ctx.book)?;

        let free_spins = match transition {
            Transition::Triggered { .. } => self.run_free_spin_session(ctx)?,
            _ => Vec::new(),
        };

        let total_payout = ctx.wallet.current_win();
        ctx.book
            .add_event(events::FINAL_WIN, json!({ "amount": total_payout }))?;

        Ok(RoundOutcome {
            base,
            transition,
            free_spins,
            total_payout,
            final_state: ctx.state.clone(),
        })
    }

    /// Play free spins until none are left, then return to the base game
    fn run_free_spin_session(&self, ctx: &mut RoundContext<'_>) -> Result<Vec<SpinRecord>> {
        let mut played = Vec::with_capacity(ctx.state.free_spin_amount as usize);

        while ctx.state.free_spin_amount > 0 {
            ctx.state.free_spin_amount -= 1;
            let spin = self.play_spin(ctx)?;
            self.bonus.on_board(ctx.state, &spin.board, ctx.book)?;
            played.push(spin);
        }

        ctx.book.add_event(
            events::FREE_SPIN_END,
            json!({
                "played": played.len(),
                "totalFs": ctx.state.total_free_spins,
                "upgraded": ctx.state.flags.free_spins_upgraded_to_super,
            }),
        )?;
        log::debug!(
            "free spin session over: {} spins, super {}",
            played.len(),
            ctx.state.flags.triggered_super_free_spins
        );

        ctx.state.spin_type = SpinType::BaseGame;
        Ok(played)
    }

    /// Draw, flag, evaluate and settle one board
    fn play_spin(&self, ctx: &mut RoundContext<'_>) -> Result<SpinRecord> {
        let spin_type = ctx.state.spin_type;
        let drawn = self.generator.draw(ctx.state, ctx.result_set, ctx.rng)?;
        let mut board = drawn.board;

        apply_anticipation(
            &mut board,
            &self.scatters,
            self.config.anticipation.threshold(spin_type),
        );
        ctx.book.add_event(events::REVEAL, self.reveal_data(&board, spin_type))?;

        let wins = self.config.paytable.evaluate(&board.grid, &self.config.symbols);
        ctx.wallet.add_spin_win(wins.total)?;
        if wins.has_wins() {
            ctx.book.add_event(
                events::WIN_INFO,
                json!({ "totalWin": wins.total, "wins": wins.wins }),
            )?;
        }
        ctx.wallet.confirm_spin_win(spin_type)?;

        Ok(SpinRecord {
            spin_type,
            scenario: drawn.resolved,
            board,
            wins,
        })
    }

    fn reveal_data(&self, board: &Board, spin_type: SpinType) -> serde_json::Value {
        let names = |reels: &[Vec<u32>]| -> Vec<Vec<&str>> {
            reels
                .iter()
                .map(|reel| reel.iter().map(|&id| self.config.symbols.name(id)).collect())
                .collect()
        };
        json!({
            "board": names(&board.grid),
            "paddingTop": names(&board.padding_top),
            "paddingBottom": names(&board.padding_bottom),
            "paddingPositions": board.reel_stops,
            "anticipation": board.anticipation,
            "gameType": spin_type,
            "reelSet": board.reel_set,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::rng::SeededRng;
    use crate::test_support::compact_game;
    use crate::wallet::LedgerWallet;

    struct Played {
        outcome: RoundOutcome,
        book: Book,
        wallet: LedgerWallet,
    }

    fn play(game: &GameConfig, criteria: &str, seed: u64) -> Played {
        let engine = RoundEngine::new(game, "base").unwrap();
        let result_set = engine.mode().result_set(criteria).unwrap();
        let mut state = RoundState::new();
        let mut rng = SeededRng::new(seed);
        let mut wallet = LedgerWallet::new();
        let mut book = Book::new(seed, criteria);
        let outcome = engine
            .play_round(&mut RoundContext {
                state: &mut state,
                rng: &mut rng,
                wallet: &mut wallet,
                book: &mut book,
                result_set,
            })
            .unwrap();
        Played { outcome, book, wallet }
    }

    #[test]
    fn test_base_round_without_trigger() {
        let game = compact_game();
        for seed in 0..50 {
            let played = play(&game, "basegame", seed);
            let outcome = &played.outcome;
            assert_eq!(outcome.transition, Transition::None);
            assert!(outcome.free_spins.is_empty());
            assert_eq!(outcome.final_state, RoundState::new());
            assert_eq!(outcome.total_payout, outcome.base_payout());
            assert_eq!(played.book.events_of(events::REVEAL).count(), 1);
            assert_eq!(played.book.events.last().unwrap().kind, events::FINAL_WIN);
        }
    }

    #[test]
    fn test_forced_round_runs_whole_session() {
        let game = compact_game();
        for seed in 0..30 {
            let played = play(&game, "freespins", seed);
            let outcome = &played.outcome;
            let state = &outcome.final_state;

            assert!(matches!(outcome.transition, Transition::Triggered { .. }));
            assert_eq!(state.spin_type, SpinType::BaseGame);
            assert_eq!(state.free_spin_amount, 0);
            assert!(state.triggered_free_spins);
            assert_eq!(outcome.free_spin_iterations(), state.total_free_spins as usize);
            assert!(outcome.free_spins.iter().all(|s| s.spin_type == SpinType::FreeSpins));
            assert_eq!(
                played.book.events_of(events::REVEAL).count(),
                outcome.free_spin_iterations() + 1
            );
            assert_eq!(played.book.events_of(events::FREE_SPIN_END).count(), 1);
            approx::assert_relative_eq!(
                outcome.total_payout,
                outcome.base_payout() + outcome.free_spin_payout(),
                epsilon = 1e-9
            );
            approx::assert_relative_eq!(
                played.wallet.current_by_type(SpinType::FreeSpins),
                outcome.free_spin_payout(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_same_seed_same_round() {
        let game = compact_game();
        let a = play(&game, "superFreespins", 77);
        let b = play(&game, "superFreespins", 77);
        assert_eq!(a.book, b.book);
        assert_eq!(a.outcome.total_payout, b.outcome.total_payout);
        assert!(a.outcome.final_state.flags.triggered_super_free_spins);
    }

    #[test]
    fn test_round_must_start_in_base_game() {
        let game = compact_game();
        let engine = RoundEngine::new(&game, "base").unwrap();
        let mut state = RoundState {
            spin_type: SpinType::FreeSpins,
            ..RoundState::default()
        };
        let result = engine.play_round(&mut RoundContext {
            state: &mut state,
            rng: &mut SeededRng::new(1),
            wallet: &mut LedgerWallet::new(),
            book: &mut Book::new(1, "basegame"),
            result_set: engine.mode().result_set("basegame").unwrap(),
        });
        assert!(matches!(result, Err(SlotError::Validation(_))));
    }

    #[test]
    fn test_next_round_starts_clean_on_shared_state() {
        let game = compact_game();
        let engine = RoundEngine::new(&game, "base").unwrap();
        let mut state = RoundState::new();
        let mut rng = SeededRng::new(5);

        let mut round = |state: &mut RoundState, criteria: &str| {
            engine
                .play_round(&mut RoundContext {
                    state,
                    rng: &mut rng,
                    wallet: &mut LedgerWallet::new(),
                    book: &mut Book::new(0, criteria),
                    result_set: engine.mode().result_set(criteria).unwrap(),
                })
                .unwrap()
        };

        let first = round(&mut state, "superFreespins");
        assert!(first.final_state.flags.triggered_super_free_spins);
        assert!(state.total_free_spins > 0);

        let second = round(&mut state, "basegame");
        assert_eq!(second.transition, Transition::None);
        assert_eq!(second.final_state, RoundState::new());

        let third = round(&mut state, "freespins");
        assert_eq!(third.final_state.total_free_spins as usize, third.free_spin_iterations());
    }

    #[test]
    fn test_unknown_mode() {
        let game = compact_game();
        assert!(matches!(RoundEngine::new(&game, "turbo"), Err(SlotError::UnknownMode(_))));
    }
}
