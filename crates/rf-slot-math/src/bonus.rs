//! Free-spin state machine
//!
//! The machine only applies transitions. Playing the resulting session is
//! the engine's job ([`crate::engine::RoundEngine`]), which keeps the
//! session loop at a single call site.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::board::Board;
use crate::book::{events, OutcomeLog};
use crate::config::{FreeSpinTable, GameConfig};
use crate::error::Result;
use crate::state::{RoundState, SpinType};

/// Outcome of feeding a completed board to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// No change
    None,
    /// Base game entered free spins
    Triggered { awarded: u32, super_triggered: bool },
    /// Free spins added to the running session
    Retriggered { awarded: u32, upgraded: bool },
}

impl Transition {
    pub fn awarded(&self) -> u32 {
        match *self {
            Self::None => 0,
            Self::Triggered { awarded, .. } | Self::Retriggered { awarded, .. } => awarded,
        }
    }
}

/// BASE_GAME ⇄ FREE_SPINS transitions driven by scatter-class counts
#[derive(Debug, Clone, Copy)]
pub struct BonusStateMachine<'a> {
    free_spins: &'a FreeSpinTable,
    scatter: u32,
    super_scatter: u32,
}

impl<'a> BonusStateMachine<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self {
            free_spins: &config.free_spins,
            scatter: config.symbols.scatter(),
            super_scatter: config.symbols.super_scatter(),
        }
    }

    /// Apply the transition for a completed board.
    ///
    /// In the base game an awarding count switches to free spins and sets
    /// the super flag if a super scatter landed. In free spins it adds spins
    /// and, the first time a super scatter lands, upgrades the session.
    pub fn on_board(&self, state: &mut RoundState, board: &Board, log: &mut dyn OutcomeLog) -> Result<Transition> {
        let supers = board.count(self.super_scatter);
        let scatters = board.count(self.scatter) + supers;

        let awarded = self.free_spins.award(state.spin_type, scatters);
        if awarded == 0 {
            return Ok(Transition::None);
        }
        state.award_free_spins(awarded);

        match state.spin_type {
            SpinType::BaseGame => {
                let super_triggered = supers > 0;
                log.add_event(
                    events::FREE_SPIN_TRIGGER,
                    json!({ "totalFs": awarded, "scatterCount": scatters }),
                )?;
                if super_triggered {
                    state.flags.triggered_super_free_spins = true;
                    log.add_event(events::SUPER_FREE_SPIN_TRIGGER, json!({ "totalFs": awarded }))?;
                }
                state.spin_type = SpinType::FreeSpins;
                log::debug!(
                    "free spins triggered: {} spins from {} scatters (super: {})",
                    awarded,
                    scatters,
                    super_triggered
                );
                Ok(Transition::Triggered {
                    awarded,
                    super_triggered,
                })
            }
            SpinType::FreeSpins => {
                log.add_event(
                    events::FREE_SPIN_RETRIGGER,
                    json!({ "totalFs": state.total_free_spins, "awarded": awarded }),
                )?;
                let upgraded = supers > 0 && !state.flags.free_spins_upgraded_to_super;
                if supers > 0 {
                    state.flags.triggered_super_free_spins = true;
                }
                if upgraded {
                    state.flags.free_spins_upgraded_to_super = true;
                    log.add_event(events::SUPER_FREE_SPIN_UPGRADE, json!({ "spinsLeft": state.free_spin_amount }))?;
                    log::debug!("free spins upgraded to super");
                }
                Ok(Transition::Retriggered { awarded, upgraded })
            }
        }
    }
}
