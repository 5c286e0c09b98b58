//! Per-round mutable state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of spin is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpinType {
    #[serde(rename = "basegame")]
    BaseGame,
    #[serde(rename = "freespins")]
    FreeSpins,
}

impl SpinType {
    pub const ALL: [SpinType; 2] = [SpinType::BaseGame, SpinType::FreeSpins];

    pub fn as_str(self) -> &'static str {
        match self {
            SpinType::BaseGame => "basegame",
            SpinType::FreeSpins => "freespins",
        }
    }
}

impl fmt::Display for SpinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bonus-tier flags. Both only ever go from false to true within a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// A super scatter was seen on a triggering or free-spin board
    pub triggered_super_free_spins: bool,
    /// The running free-spin session escalated to the super tier
    pub free_spins_upgraded_to_super: bool,
}

/// State owned by one play round and its free-spin session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub spin_type: SpinType,
    /// Free spins left to play in the current session
    pub free_spin_amount: u32,
    /// Free spins awarded over the whole round
    pub total_free_spins: u32,
    /// Free spins were triggered at least once this round
    pub triggered_free_spins: bool,
    pub flags: FeatureFlags,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            spin_type: SpinType::BaseGame,
            free_spin_amount: 0,
            total_free_spins: 0,
            triggered_free_spins: false,
            flags: FeatureFlags::default(),
        }
    }
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to a fresh base-game state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add free spins to the running session
    pub fn award_free_spins(&mut self, amount: u32) {
        self.free_spin_amount += amount;
        self.total_free_spins += amount;
        self.triggered_free_spins = true;
    }

    pub fn in_free_spins(&self) -> bool {
        self.spin_type == SpinType::FreeSpins
    }
}
