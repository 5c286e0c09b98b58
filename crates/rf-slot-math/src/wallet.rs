//! Wallet: accumulates the monetary effect of a round

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::state::SpinType;

/// Receives payouts from the engine
pub trait Wallet {
    /// Add a board's payout to the pending spin win
    fn add_spin_win(&mut self, amount: f64) -> Result<()>;

    /// Finalize the pending spin win under `spin_type`. Called exactly once
    /// per board.
    fn confirm_spin_win(&mut self, spin_type: SpinType) -> Result<()>;

    /// Confirmed win of the round so far
    fn current_win(&self) -> f64;
}

/// Ledger wallet with per-spin-type and cumulative totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerWallet {
    /// Pending win of the board being played
    spin_win: f64,
    /// Confirmed win of the current round
    current_win: f64,
    /// Confirmed win of the current round per spin type
    current_by_type: BTreeMap<SpinType, f64>,
    /// All confirmed rounds
    pub cumulative_win: f64,
    pub cumulative_by_type: BTreeMap<SpinType, f64>,
    pub rounds_confirmed: u64,
}

/// Final figures for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundWin {
    /// Total win after cap and rounding
    pub total: f64,
    pub basegame: f64,
    pub freespins: f64,
    /// The max-win cap cut the total
    pub capped: bool,
}

impl LedgerWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_by_type(&self, spin_type: SpinType) -> f64 {
        self.current_by_type.get(&spin_type).copied().unwrap_or(0.0)
    }

    /// Close the round: cap at `max_win_x`, round to cents, check the
    /// per-spin-type split adds up, then roll into the cumulative totals.
    pub fn confirm_round(&mut self, max_win_x: f64) -> Result<RoundWin> {
        if self.spin_win != 0.0 {
            return Err(SlotError::Wallet(format!(
                "unconfirmed spin win {} at round end",
                self.spin_win
            )));
        }

        let split_sum: f64 = self.current_by_type.values().sum();
        if (split_sum - self.current_win).abs() > 1e-6 {
            return Err(SlotError::Wallet(format!(
                "spin type split {split_sum} does not match round win {}",
                self.current_win
            )));
        }

        let capped = self.current_win > max_win_x;
        let scale = if capped { max_win_x / self.current_win } else { 1.0 };
        let basegame = round_cents(self.current_by_type(SpinType::BaseGame) * scale);
        let freespins = round_cents(self.current_by_type(SpinType::FreeSpins) * scale);
        let total = round_cents(self.current_win.min(max_win_x));

        self.cumulative_win += total;
        *self.cumulative_by_type.entry(SpinType::BaseGame).or_default() += basegame;
        *self.cumulative_by_type.entry(SpinType::FreeSpins).or_default() += freespins;
        self.rounds_confirmed += 1;

        self.reset_round();

        Ok(RoundWin {
            total,
            basegame,
            freespins,
            capped,
        })
    }

    /// Drop anything pending for the current round
    pub fn reset_round(&mut self) {
        self.spin_win = 0.0;
        self.current_win = 0.0;
        self.current_by_type.clear();
    }
}

impl Wallet for LedgerWallet {
    fn add_spin_win(&mut self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SlotError::Wallet(format!("invalid spin win {amount}")));
        }
        self.spin_win += amount;
        Ok(())
    }

    fn confirm_spin_win(&mut self, spin_type: SpinType) -> Result<()> {
        *self.current_by_type.entry(spin_type).or_default() += self.spin_win;
        self.current_win += self.spin_win;
        self.spin_win = 0.0;
        Ok(())
    }

    fn current_win(&self) -> f64 {
        self.current_win
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
