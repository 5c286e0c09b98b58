//! Result sets: requested-outcome descriptors for a round
//!
//! A result set forces or biases what a round produces (free spins, the
//! super tier, max win) and decides afterwards whether the round delivered.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rng::RandomSource;
use crate::sampler::WeightTable;
use crate::state::{RoundState, SpinType};

/// State conditions that swap in a different reel-set weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReelCondition {
    /// The round has entered the super free-spin tier
    SuperFreeSpinsTriggered,
    /// Super tier entered and the result set forces max win
    SuperFreeSpinsMaxWin,
}

impl ReelCondition {
    pub fn holds(self, state: &RoundState, force_max_win: bool) -> bool {
        match self {
            ReelCondition::SuperFreeSpinsTriggered => state.flags.triggered_super_free_spins,
            ReelCondition::SuperFreeSpinsMaxWin => {
                state.flags.triggered_super_free_spins && force_max_win
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReelWeightOverride {
    pub when: ReelCondition,
    pub weights: WeightTable<String>,
}

/// Reel-set weights per spin type, with conditional overrides
#[derive(Debug, Clone)]
pub struct ReelWeights {
    pub basegame: WeightTable<String>,
    pub freespins: WeightTable<String>,
    /// Checked in order; the first holding condition wins
    pub overrides: Vec<ReelWeightOverride>,
}

impl ReelWeights {
    pub fn new(basegame: WeightTable<String>, freespins: WeightTable<String>) -> Self {
        Self {
            basegame,
            freespins,
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, when: ReelCondition, weights: WeightTable<String>) -> Self {
        self.overrides.push(ReelWeightOverride { when, weights });
        self
    }

    /// Table in effect for the current state
    pub fn table_for(&self, state: &RoundState, force_max_win: bool) -> &WeightTable<String> {
        if let Some(o) = self
            .overrides
            .iter()
            .find(|o| o.when.holds(state, force_max_win))
        {
            return &o.weights;
        }
        match state.spin_type {
            SpinType::BaseGame => &self.basegame,
            SpinType::FreeSpins => &self.freespins,
        }
    }

    /// Every reel set id referenced by any table
    pub fn reel_set_ids(&self) -> impl Iterator<Item = &String> {
        self.basegame
            .keys()
            .chain(self.freespins.keys())
            .chain(self.overrides.iter().flat_map(|o| o.weights.keys()))
    }
}

/// Extra acceptance checks beyond the core criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSetCheck {
    /// The free-spin session must have escalated to the super tier
    FreeSpinsUpgraded,
}

impl ResultSetCheck {
    pub fn passes(self, state: &RoundState) -> bool {
        match self {
            ResultSetCheck::FreeSpinsUpgraded => {
                state.triggered_free_spins && state.flags.free_spins_upgraded_to_super
            }
        }
    }
}

/// Optional scenario switches, all off by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultSetFlags {
    /// Base-game trigger must carry a super scatter
    pub force_super_free_spins: bool,
    /// Free spins may escalate to the super tier mid-session
    pub upgrade_free_spins: bool,
}

/// A requested round outcome
#[derive(Debug, Clone)]
pub struct ResultSet {
    /// Criteria key; also selects the scatter-count bucket
    pub criteria: String,
    /// Share of simulated rounds assigned to this result set
    pub quota: f64,
    /// Exact total win required (bet multiple)
    pub multiplier: Option<f64>,
    pub force_free_spins: bool,
    pub force_max_win: bool,
    pub flags: ResultSetFlags,
    pub reel_weights: ReelWeights,
    pub check: Option<ResultSetCheck>,
}

impl ResultSet {
    pub fn new(criteria: impl Into<String>, quota: f64, reel_weights: ReelWeights) -> Self {
        Self {
            criteria: criteria.into(),
            quota,
            multiplier: None,
            force_free_spins: false,
            force_max_win: false,
            flags: ResultSetFlags::default(),
            reel_weights,
            check: None,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_forced_free_spins(mut self) -> Self {
        self.force_free_spins = true;
        self
    }

    pub fn with_forced_max_win(mut self) -> Self {
        self.force_max_win = true;
        self
    }

    pub fn with_flags(mut self, flags: ResultSetFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_check(mut self, check: ResultSetCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Pick the reel set id for the next board
    pub fn choose_reel_set(&self, state: &RoundState, rng: &mut dyn RandomSource) -> Result<&str> {
        self.reel_weights
            .table_for(state, self.force_max_win)
            .pick(rng)
            .map(String::as_str)
    }

    /// Did the finished round deliver what this result set asked for?
    pub fn meets_criteria(&self, state: &RoundState, total_win: f64, max_win_x: f64) -> bool {
        let free_spins_met = !self.force_free_spins || state.triggered_free_spins;

        let multiplier_met = match self.multiplier {
            Some(m) => (total_win - m).abs() < 1e-9 && !self.force_max_win,
            None => total_win > 0.0,
        };

        let max_win_met = !self.force_max_win || total_win >= max_win_x;

        let check_met = self.check.is_none_or(|c| c.passes(state));

        free_spins_met && multiplier_met && max_win_met && check_met
    }
}
