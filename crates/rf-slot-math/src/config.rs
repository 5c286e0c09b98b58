//! Immutable game configuration
//!
//! [`GameConfig`] is built once (usually by [`crate::parser::ConfigParser`])
//! and then shared read-only by every round, across threads.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::parser::ConfigParser;
use crate::paytable::PayTable;
use crate::reels::ReelSet;
use crate::result_set::ResultSet;
use crate::sampler::ScatterWeights;
use crate::state::SpinType;
use crate::symbols::SymbolTable;

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self { reels: 5, rows: 3 }
    }

    pub fn reel_count(&self) -> usize {
        self.reels as usize
    }

    pub fn row_count(&self) -> usize {
        self.rows as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Free spins awarded per scatter-class count, per spin type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSpinTable {
    awards: BTreeMap<SpinType, BTreeMap<u8, u32>>,
}

impl FreeSpinTable {
    pub fn new(awards: BTreeMap<SpinType, BTreeMap<u8, u32>>) -> Self {
        Self { awards }
    }

    /// Free spins for `scatters` on a `spin_type` board; 0 when unlisted
    pub fn award(&self, spin_type: SpinType, scatters: usize) -> u32 {
        let Ok(count) = u8::try_from(scatters) else {
            return 0;
        };
        self.awards
            .get(&spin_type)
            .and_then(|t| t.get(&count))
            .copied()
            .unwrap_or(0)
    }

    pub fn table(&self, spin_type: SpinType) -> Option<&BTreeMap<u8, u32>> {
        self.awards.get(&spin_type)
    }

    /// Smallest scatter count that awards anything
    pub fn min_count(&self, spin_type: SpinType) -> Option<u8> {
        self.table(spin_type)?.keys().next().copied()
    }

    pub fn max_count(&self, spin_type: SpinType) -> Option<u8> {
        self.table(spin_type)?.keys().next_back().copied()
    }

    /// Clamp a requested scatter count into the table's range for `spin_type`
    pub fn clamp_scatter_count(&self, spin_type: SpinType, requested: u8) -> Result<u8> {
        match (self.min_count(spin_type), self.max_count(spin_type)) {
            (Some(min), Some(max)) => Ok(requested.clamp(min, max)),
            _ => Err(SlotError::MissingFreeSpinTable(spin_type.to_string())),
        }
    }
}

/// Scatter-bearing reel count at which anticipation starts, per spin type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnticipationTriggers {
    thresholds: BTreeMap<SpinType, u8>,
}

impl AnticipationTriggers {
    pub fn new(thresholds: BTreeMap<SpinType, u8>) -> Self {
        Self { thresholds }
    }

    /// One less than the smallest awarding scatter count, per spin type
    pub fn from_free_spins(table: &FreeSpinTable) -> Self {
        let thresholds = SpinType::ALL
            .iter()
            .filter_map(|&st| table.min_count(st).map(|min| (st, min.saturating_sub(1))))
            .collect();
        Self { thresholds }
    }

    /// Threshold for `spin_type`; spin types without one never anticipate
    pub fn threshold(&self, spin_type: SpinType) -> u8 {
        self.thresholds.get(&spin_type).copied().unwrap_or(u8::MAX)
    }
}

/// A purchasable way to play
#[derive(Debug, Clone)]
pub struct GameMode {
    pub name: String,
    /// Price in bet multiples
    pub cost: f64,
    /// Target RTP, informational
    pub rtp: Option<f64>,
    pub is_bonus_buy: bool,
    pub reel_sets: BTreeMap<String, ReelSet>,
    pub result_sets: Vec<ResultSet>,
}

impl GameMode {
    pub fn reel_set(&self, id: &str) -> Result<&ReelSet> {
        self.reel_sets
            .get(id)
            .ok_or_else(|| SlotError::UnknownReelSet(format!("{id} (mode {})", self.name)))
    }

    pub fn result_set(&self, criteria: &str) -> Result<&ResultSet> {
        self.result_sets
            .iter()
            .find(|rs| rs.criteria == criteria)
            .ok_or_else(|| SlotError::UnknownCriteria(format!("{criteria} (mode {})", self.name)))
    }

    fn validate(&self, grid: &GridSpec) -> Result<()> {
        if self.cost <= 0.0 {
            return Err(SlotError::Validation(format!(
                "mode {} must have a positive cost",
                self.name
            )));
        }
        for set in self.reel_sets.values() {
            set.validate(grid.reel_count())?;
        }
        if self.result_sets.is_empty() {
            return Err(SlotError::Validation(format!(
                "mode {} has no result sets",
                self.name
            )));
        }
        for rs in &self.result_sets {
            if let Some(id) = rs.reel_weights.reel_set_ids().find(|id| !self.reel_sets.contains_key(*id)) {
                return Err(SlotError::UnknownReelSet(format!(
                    "{id} (result set {} of mode {})",
                    rs.criteria, self.name
                )));
            }
        }
        Ok(())
    }
}

/// Default bound on rejection-sampling attempts per board
pub const DEFAULT_MAX_DRAW_ATTEMPTS: u32 = 100_000;

/// Complete, validated game definition
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub id: String,
    pub name: String,
    pub grid: GridSpec,
    pub symbols: SymbolTable,
    pub paytable: PayTable,
    pub free_spins: FreeSpinTable,
    pub anticipation: AnticipationTriggers,
    pub scatter_weights: ScatterWeights,
    /// Round win cap in bet multiples
    pub max_win_x: f64,
    /// Strip symbols kept above and below the window
    pub pad_symbols: usize,
    /// Rejection-sampling bound per board draw
    pub max_draw_attempts: u32,
    pub modes: BTreeMap<String, GameMode>,
}

impl GameConfig {
    /// Parse and validate a YAML game document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        ConfigParser::new().parse_yaml(yaml)
    }

    /// Parse and validate a JSON game document
    pub fn from_json_str(json: &str) -> Result<Self> {
        ConfigParser::new().parse_json(json)
    }

    /// Load from a `.yaml`/`.yml`/`.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        ConfigParser::new().load(path.as_ref())
    }

    pub fn mode(&self, name: &str) -> Result<&GameMode> {
        self.modes
            .get(name)
            .ok_or_else(|| SlotError::UnknownMode(name.to_string()))
    }

    /// Cross-checks that individual components cannot make on their own
    pub fn validate(&self) -> Result<()> {
        if self.grid.reels == 0 || self.grid.rows == 0 {
            return Err(SlotError::InvalidGrid(format!(
                "{}×{} grid",
                self.grid.reels, self.grid.rows
            )));
        }
        if self.free_spins.table(SpinType::BaseGame).is_none() {
            return Err(SlotError::MissingFreeSpinTable(SpinType::BaseGame.to_string()));
        }
        if self.max_win_x <= 0.0 {
            return Err(SlotError::Validation("max_win_x must be positive".into()));
        }
        if self.max_draw_attempts == 0 {
            return Err(SlotError::Validation("max_draw_attempts must be positive".into()));
        }
        if self.modes.is_empty() {
            return Err(SlotError::Validation("no game modes defined".into()));
        }
        for line in self.paytable.lines() {
            line.validate(self.grid.reel_count(), self.grid.row_count())?;
        }
        for mode in self.modes.values() {
            mode.validate(&self.grid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_table() -> FreeSpinTable {
        FreeSpinTable::new(BTreeMap::from([
            (SpinType::BaseGame, BTreeMap::from([(3, 10), (4, 12), (5, 15)])),
            (SpinType::FreeSpins, BTreeMap::from([(3, 6), (4, 8), (5, 10)])),
        ]))
    }

    #[test]
    fn test_award_lookup() {
        let table = reference_table();
        assert_eq!(table.award(SpinType::BaseGame, 4), 12);
        assert_eq!(table.award(SpinType::FreeSpins, 5), 10);
        assert_eq!(table.award(SpinType::BaseGame, 2), 0);
        assert_eq!(table.award(SpinType::BaseGame, 6), 0);
        assert_eq!(table.award(SpinType::BaseGame, 1000), 0);
    }

    #[test]
    fn test_clamp() {
        let table = reference_table();
        assert_eq!(table.clamp_scatter_count(SpinType::BaseGame, 1).unwrap(), 3);
        assert_eq!(table.clamp_scatter_count(SpinType::BaseGame, 4).unwrap(), 4);
        assert_eq!(table.clamp_scatter_count(SpinType::FreeSpins, 9).unwrap(), 5);

        let base_only = FreeSpinTable::new(BTreeMap::from([(
            SpinType::BaseGame,
            BTreeMap::from([(3, 10)]),
        )]));
        assert!(matches!(
            base_only.clamp_scatter_count(SpinType::FreeSpins, 3),
            Err(SlotError::MissingFreeSpinTable(_))
        ));
    }

    #[test]
    fn test_triggers_derived_from_table() {
        let triggers = AnticipationTriggers::from_free_spins(&reference_table());
        assert_eq!(triggers.threshold(SpinType::BaseGame), 2);
        assert_eq!(triggers.threshold(SpinType::FreeSpins), 2);

        let empty = AnticipationTriggers::default();
        assert_eq!(empty.threshold(SpinType::BaseGame), u8::MAX);
    }

    #[test]
    fn test_grid_default() {
        let grid = GridSpec::default();
        assert_eq!(grid.reel_count(), 5);
        assert_eq!(grid.row_count(), 3);
    }
}
