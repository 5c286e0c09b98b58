//! Game document parser: YAML/JSON into a validated [`GameConfig`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConfigParser::new().parse_yaml(&std::fs::read_to_string("games/lines_example.yaml")?)?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{
    AnticipationTriggers, DEFAULT_MAX_DRAW_ATTEMPTS, FreeSpinTable, GameConfig, GameMode, GridSpec,
};
use crate::error::{Result, SlotError};
use crate::paytable::{PayTable, Payline, standard_15_paylines};
use crate::reels::{ReelGenerator, ReelGeneratorConfig, ReelSet};
use crate::result_set::{ReelCondition, ReelWeights, ResultSet, ResultSetCheck, ResultSetFlags};
use crate::sampler::{ScatterWeights, WeightTable};
use crate::state::SpinType;
use crate::symbols::{SymbolKind, SymbolTable};

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Serialized game definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub game: GameInfoDoc,
    #[serde(default)]
    pub grid: GridSpec,
    pub symbols: Vec<SymbolDoc>,
    /// Line number → row per reel. Defaults to the 15 standard 5×3 lines.
    #[serde(default)]
    pub paylines: Option<BTreeMap<u16, Vec<u8>>>,
    pub free_spins: BTreeMap<SpinType, BTreeMap<u8, u32>>,
    /// Derived from `free_spins` when absent
    #[serde(default)]
    pub anticipation_triggers: Option<BTreeMap<SpinType, u8>>,
    pub scatter_weights: ScatterWeightsDoc,
    pub reel_sets: BTreeMap<String, ReelSetDoc>,
    pub modes: BTreeMap<String, ModeDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfoDoc {
    pub id: String,
    pub name: String,
    pub max_win_x: f64,
    #[serde(default = "default_pad")]
    pub pad_symbols: usize,
    #[serde(default = "default_max_draw_attempts")]
    pub max_draw_attempts: u32,
}

fn default_pad() -> usize {
    1
}

fn default_max_draw_attempts() -> u32 {
    DEFAULT_MAX_DRAW_ATTEMPTS
}

fn default_kind() -> SymbolKind {
    SymbolKind::Regular
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDoc {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: SymbolKind,
    #[serde(default)]
    pub pays: BTreeMap<u8, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterWeightsDoc {
    /// Bucket used for unknown criteria
    pub default: String,
    pub buckets: BTreeMap<String, BTreeMap<u8, f64>>,
}

/// Reel set entry; exactly one source field must be set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReelSetDoc {
    /// Inline strips, one list of symbol names per reel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reels: Option<Vec<Vec<String>>>,
    /// CSV file, relative to the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<PathBuf>,
    /// Built by the reel generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<ReelGeneratorConfig>,
}

/// Where a reel set comes from
#[derive(Debug, Clone, Copy)]
pub enum ReelSetSource<'a> {
    Reels(&'a [Vec<String>]),
    Csv(&'a Path),
    Generated(&'a ReelGeneratorConfig),
}

impl ReelSetDoc {
    pub fn source(&self, id: &str) -> Result<ReelSetSource<'_>> {
        match (&self.reels, &self.csv, &self.generated) {
            (Some(reels), None, None) => Ok(ReelSetSource::Reels(reels)),
            (None, Some(path), None) => Ok(ReelSetSource::Csv(path)),
            (None, None, Some(config)) => Ok(ReelSetSource::Generated(config)),
            _ => Err(SlotError::Validation(format!(
                "reel set {id} needs exactly one of reels, csv or generated"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeDoc {
    pub cost: f64,
    #[serde(default)]
    pub rtp: Option<f64>,
    #[serde(default)]
    pub is_bonus_buy: bool,
    /// Reel sets available to this mode; all when absent
    #[serde(default)]
    pub reel_sets: Option<Vec<String>>,
    pub result_sets: Vec<ResultSetDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSetDoc {
    pub criteria: String,
    pub quota: f64,
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub force_free_spins: bool,
    #[serde(default)]
    pub force_max_win: bool,
    #[serde(default)]
    pub flags: ResultSetFlags,
    #[serde(default)]
    pub check: Option<ResultSetCheck>,
    pub reel_weights: ReelWeightsDoc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelWeightsDoc {
    pub basegame: BTreeMap<String, f64>,
    pub freespins: BTreeMap<String, f64>,
    #[serde(default)]
    pub overrides: Vec<ReelOverrideDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelOverrideDoc {
    pub when: ReelCondition,
    pub weights: BTreeMap<String, f64>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSER
// ═══════════════════════════════════════════════════════════════════════════════

/// Parsing limits for security
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    pub max_name_length: usize,
    pub max_symbols: usize,
    pub max_paylines: usize,
    pub max_reels: usize,
    pub max_rows: usize,
    pub max_strip_len: usize,
    pub max_pay_value: f64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_name_length: 256,
            max_symbols: 50,
            max_paylines: 100,
            max_reels: 10,
            max_rows: 10,
            max_strip_len: 10_000,
            max_pay_value: 100_000.0,
        }
    }
}

/// Game document parser
#[derive(Debug, Clone, Default)]
pub struct ConfigParser {
    pub limits: ConfigLimits,
    /// Directory CSV reel sets are resolved against
    pub base_dir: Option<PathBuf>,
}

impl ConfigParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: ConfigLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn parse_yaml(&self, yaml: &str) -> Result<GameConfig> {
        let doc: ConfigDocument = serde_yml::from_str(yaml)?;
        self.build(doc)
    }

    pub fn parse_json(&self, json: &str) -> Result<GameConfig> {
        let doc: ConfigDocument = serde_json::from_str(json)?;
        self.build(doc)
    }

    /// Load by extension; CSV reel sets resolve next to the file
    pub fn load(&self, path: &Path) -> Result<GameConfig> {
        let text = std::fs::read_to_string(path)?;
        let parser = match (&self.base_dir, path.parent()) {
            (None, Some(dir)) => self.clone().with_base_dir(dir),
            _ => self.clone(),
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => parser.parse_json(&text),
            Some("yaml") | Some("yml") => parser.parse_yaml(&text),
            other => Err(SlotError::Parse(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }

    /// Check document sizes against the limits
    pub fn validate(&self, doc: &ConfigDocument) -> Result<()> {
        let limits = &self.limits;
        let fail = |msg: String| Err(SlotError::Validation(msg));

        if doc.game.name.len() > limits.max_name_length {
            return fail(format!(
                "Game name too long: {} > {}",
                doc.game.name.len(),
                limits.max_name_length
            ));
        }
        if doc.symbols.len() > limits.max_symbols {
            return fail(format!(
                "Too many symbols: {} > {}",
                doc.symbols.len(),
                limits.max_symbols
            ));
        }
        if doc.grid.reels as usize > limits.max_reels {
            return fail(format!("Too many reels: {} > {}", doc.grid.reels, limits.max_reels));
        }
        if doc.grid.rows as usize > limits.max_rows {
            return fail(format!("Too many rows: {} > {}", doc.grid.rows, limits.max_rows));
        }
        if let Some(lines) = &doc.paylines {
            if lines.len() > limits.max_paylines {
                return fail(format!(
                    "Too many paylines: {} > {}",
                    lines.len(),
                    limits.max_paylines
                ));
            }
        }
        for sym in &doc.symbols {
            if let Some(pay) = sym.pays.values().find(|p| !p.is_finite() || **p < 0.0 || **p > limits.max_pay_value) {
                return fail(format!("Invalid pay value {pay} for symbol {}", sym.name));
            }
        }
        for (id, entry) in &doc.reel_sets {
            if let ReelSetSource::Generated(g) = entry.source(id)? {
                if g.strip_len > limits.max_strip_len {
                    return fail(format!(
                        "Reel set {id} strip too long: {} > {}",
                        g.strip_len, limits.max_strip_len
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate and convert a document into a [`GameConfig`]
    pub fn build(&self, doc: ConfigDocument) -> Result<GameConfig> {
        self.validate(&doc)?;

        let grid = doc.grid;
        let symbols = SymbolTable::new(
            doc.symbols
                .into_iter()
                .map(|s| (s.name, s.kind, s.pays)),
        )?;

        let lines = match doc.paylines {
            Some(map) => map
                .into_iter()
                .map(|(number, rows)| Payline::new(number, rows))
                .collect(),
            None => standard_15_paylines(),
        };
        let paytable = PayTable::new(lines, grid.reel_count(), grid.row_count())?;

        let free_spins = FreeSpinTable::new(doc.free_spins);
        let anticipation = match doc.anticipation_triggers {
            Some(map) => AnticipationTriggers::new(map),
            None => AnticipationTriggers::from_free_spins(&free_spins),
        };

        let buckets = doc
            .scatter_weights
            .buckets
            .iter()
            .map(|(name, map)| -> Result<(String, WeightTable<u8>)> {
                Ok((name.clone(), WeightTable::from_map(name.as_str(), map)?))
            })
            .collect::<Result<BTreeMap<String, WeightTable<u8>>>>()?;
        let scatter_weights = ScatterWeights::new(doc.scatter_weights.default, buckets)?;

        let mut reel_sets = BTreeMap::new();
        for (id, entry) in &doc.reel_sets {
            let set = self.build_reel_set(id, entry.source(id)?, &symbols, grid.reel_count())?;
            reel_sets.insert(id.clone(), set);
        }

        let mut modes = BTreeMap::new();
        for (name, mode) in doc.modes {
            let built = build_mode(&name, mode, &reel_sets)?;
            modes.insert(name, built);
        }

        let config = GameConfig {
            id: doc.game.id,
            name: doc.game.name,
            grid,
            symbols,
            paytable,
            free_spins,
            anticipation,
            scatter_weights,
            max_win_x: doc.game.max_win_x,
            pad_symbols: doc.game.pad_symbols,
            max_draw_attempts: doc.game.max_draw_attempts,
            modes,
        };
        config.validate()?;

        log::info!(
            "loaded game {} ({}): {}×{} grid, {} symbols, {} lines, {} reel sets, {} modes",
            config.id,
            config.name,
            grid.reels,
            grid.rows,
            config.symbols.len(),
            config.paytable.len(),
            reel_sets.len(),
            config.modes.len()
        );
        Ok(config)
    }

    fn build_reel_set(
        &self,
        id: &str,
        source: ReelSetSource<'_>,
        symbols: &SymbolTable,
        reel_count: usize,
    ) -> Result<ReelSet> {
        match source {
            ReelSetSource::Reels(reels) => ReelSet::from_names(id, reels, symbols),
            ReelSetSource::Csv(path) => {
                let full = match &self.base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.to_path_buf(),
                };
                let text = std::fs::read_to_string(&full)?;
                ReelSet::from_csv(id, &text, reel_count, symbols)
            }
            ReelSetSource::Generated(config) => {
                ReelGenerator::new(id, config, symbols)?.generate(reel_count)
            }
        }
    }
}

fn build_mode(name: &str, doc: ModeDoc, all_sets: &BTreeMap<String, ReelSet>) -> Result<GameMode> {
    let reel_sets = match &doc.reel_sets {
        Some(ids) => ids
            .iter()
            .map(|id| {
                all_sets
                    .get(id)
                    .map(|set| (id.clone(), set.clone()))
                    .ok_or_else(|| SlotError::UnknownReelSet(format!("{id} (mode {name})")))
            })
            .collect::<Result<BTreeMap<_, _>>>()?,
        None => all_sets.clone(),
    };

    let result_sets = doc
        .result_sets
        .into_iter()
        .map(build_result_set)
        .collect::<Result<Vec<_>>>()?;

    Ok(GameMode {
        name: name.to_string(),
        cost: doc.cost,
        rtp: doc.rtp,
        is_bonus_buy: doc.is_bonus_buy,
        reel_sets,
        result_sets,
    })
}

fn build_result_set(doc: ResultSetDoc) -> Result<ResultSet> {
    if !doc.quota.is_finite() || doc.quota < 0.0 {
        return Err(SlotError::Validation(format!(
            "result set {} has invalid quota {}",
            doc.criteria, doc.quota
        )));
    }

    let table = |suffix: &str, map: &BTreeMap<String, f64>| {
        WeightTable::from_map(format!("{}/{suffix}", doc.criteria), map)
    };
    let mut weights = ReelWeights::new(
        table("basegame", &doc.reel_weights.basegame)?,
        table("freespins", &doc.reel_weights.freespins)?,
    );
    for o in &doc.reel_weights.overrides {
        weights = weights.with_override(o.when, table("override", &o.weights)?);
    }

    let mut rs = ResultSet::new(doc.criteria.clone(), doc.quota, weights).with_flags(doc.flags);
    rs.multiplier = doc.multiplier;
    rs.force_free_spins = doc.force_free_spins;
    rs.force_max_win = doc.force_max_win;
    rs.check = doc.check;
    Ok(rs)
}
