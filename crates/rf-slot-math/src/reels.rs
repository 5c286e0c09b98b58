//! Reel strips, reel sets and the reel-strip generator
//!
//! A [`ReelSet`] is either given verbatim (inline lists or CSV) or built by
//! [`ReelGenerator`] from symbol weights plus placement rules: quotas, reel
//! limits, spacing and stacks. Generation is deterministic for a given
//! configuration and seed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SlotError};
use crate::rng::{RandomSource, SeededRng};
use crate::sampler::WeightTable;
use crate::symbols::SymbolTable;

// ═══════════════════════════════════════════════════════════════════════════════
// STRIPS
// ═══════════════════════════════════════════════════════════════════════════════

/// One reel's virtual strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelStrip {
    /// Reel index (0-based)
    pub reel_index: usize,
    /// Symbol ids from top to bottom; the strip wraps
    pub symbols: Vec<u32>,
}

impl ReelStrip {
    pub fn new(reel_index: usize, symbols: Vec<u32>) -> Self {
        Self { reel_index, symbols }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at a (possibly negative or overflowing) position, wrapping
    pub fn symbol_at(&self, position: i64) -> u32 {
        let len = self.symbols.len() as i64;
        self.symbols[position.rem_euclid(len) as usize]
    }

    /// Positions carrying `symbol`
    pub fn stops_for(&self, symbol: u32) -> Vec<usize> {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == symbol)
            .map(|(i, _)| i)
            .collect()
    }

    /// Occurrences of `symbol` on the strip
    pub fn count(&self, symbol: u32) -> usize {
        self.symbols.iter().filter(|s| **s == symbol).count()
    }
}

/// A named set of strips, one per reel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSet {
    pub id: String,
    pub reels: Vec<ReelStrip>,
}

impl ReelSet {
    pub fn new(id: impl Into<String>, reels: Vec<Vec<u32>>) -> Self {
        Self {
            id: id.into(),
            reels: reels
                .into_iter()
                .enumerate()
                .map(|(i, s)| ReelStrip::new(i, s))
                .collect(),
        }
    }

    /// Build from per-reel symbol names
    pub fn from_names(id: &str, reels: &[Vec<String>], symbols: &SymbolTable) -> Result<Self> {
        let context = format!("reel set {id}");
        let resolved = reels
            .iter()
            .map(|reel| {
                reel.iter()
                    .map(|name| symbols.resolve(name.trim(), &context))
                    .collect::<Result<Vec<u32>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(id, resolved))
    }

    /// Parse a CSV where each row is one strip position and each column a reel.
    ///
    /// Empty cells are skipped, so reels may have different lengths.
    pub fn from_csv(id: &str, csv: &str, reel_count: usize, symbols: &SymbolTable) -> Result<Self> {
        let mut reels: Vec<Vec<String>> = vec![Vec::new(); reel_count];
        for (line_no, row) in csv.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let cells: Vec<&str> = row.split(',').collect();
            if cells.len() > reel_count {
                return Err(SlotError::Parse(format!(
                    "reel set {id}: row {} has {} columns, expected at most {reel_count}",
                    line_no + 1,
                    cells.len()
                )));
            }
            for (reel, cell) in cells.iter().enumerate() {
                let cell = cell.trim();
                if !cell.is_empty() {
                    reels[reel].push(cell.to_string());
                }
            }
        }
        Self::from_names(id, &reels, symbols)
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    /// Check strip count against the grid and that no strip is empty
    pub fn validate(&self, reels: usize) -> Result<()> {
        if self.reels.len() != reels {
            return Err(SlotError::Validation(format!(
                "reel set {} has {} reels, grid has {reels}",
                self.id,
                self.reels.len()
            )));
        }
        if let Some(strip) = self.reels.iter().find(|s| s.is_empty()) {
            return Err(SlotError::Validation(format!(
                "reel set {} has an empty strip on reel {}",
                self.id, strip.reel_index
            )));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// A number given once for all reels or per reel index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PerReel {
    All(f64),
    Reels(BTreeMap<usize, f64>),
}

impl PerReel {
    pub fn for_reel(&self, reel: usize) -> Option<f64> {
        match self {
            PerReel::All(v) => Some(*v),
            PerReel::Reels(map) => map.get(&reel).copied(),
        }
    }
}

// Hand-written so map keys parse from both YAML integers and JSON strings
impl<'de> Deserialize<'de> for PerReel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PerReelVisitor;

        impl<'de> Visitor<'de> for PerReelVisitor {
            type Value = PerReel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a map of reel index to number")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<PerReel, E> {
                Ok(PerReel::All(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<PerReel, E> {
                Ok(PerReel::All(v as f64))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<PerReel, E> {
                Ok(PerReel::All(v as f64))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<PerReel, A::Error> {
                let mut reels = BTreeMap::new();
                while let Some((key, value)) = map.next_entry::<ReelKey, f64>()? {
                    reels.insert(key.0, value);
                }
                Ok(PerReel::Reels(reels))
            }
        }

        deserializer.deserialize_any(PerReelVisitor)
    }
}

struct ReelKey(usize);

impl<'de> Deserialize<'de> for ReelKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = ReelKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a reel index")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ReelKey, E> {
                usize::try_from(v).map(ReelKey).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ReelKey, E> {
                usize::try_from(v).map(ReelKey).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ReelKey, E> {
                v.trim().parse().map(ReelKey).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Stacked placement rule for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackRule {
    /// Chance in percent (1-100) that a placement becomes a stack
    pub chance: PerReel,
    #[serde(default = "default_stack_min")]
    pub min: u32,
    #[serde(default = "default_stack_max")]
    pub max: u32,
}

fn default_stack_min() -> u32 {
    1
}

fn default_stack_max() -> u32 {
    4
}

fn default_strip_len() -> usize {
    250
}

/// Reel generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelGeneratorConfig {
    /// Relative weight per symbol name
    pub symbol_weights: BTreeMap<String, f64>,
    /// Positions per strip
    #[serde(default = "default_strip_len")]
    pub strip_len: usize,
    /// Symbols restricted to the listed reels
    #[serde(default)]
    pub limit_to_reels: BTreeMap<String, Vec<usize>>,
    /// Guaranteed share of the strip, in percent (at least one placement)
    #[serde(default)]
    pub quotas: BTreeMap<String, PerReel>,
    /// Minimum circular distance between two copies of any symbol (1-8)
    #[serde(default)]
    pub space_between_same: Option<usize>,
    /// Minimum distance between specific symbol pairs (1-8)
    #[serde(default)]
    pub space_between: BTreeMap<String, BTreeMap<String, usize>>,
    #[serde(default)]
    pub stacks: BTreeMap<String, StackRule>,
    #[serde(default)]
    pub seed: u64,
}

impl Default for ReelGeneratorConfig {
    fn default() -> Self {
        Self {
            symbol_weights: BTreeMap::new(),
            strip_len: default_strip_len(),
            limit_to_reels: BTreeMap::new(),
            quotas: BTreeMap::new(),
            space_between_same: None,
            space_between: BTreeMap::new(),
            stacks: BTreeMap::new(),
            seed: 0,
        }
    }
}

const MAX_SPACING: usize = 8;
const MAX_FILL_TRIES: u32 = 2500;

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds reel sets from a [`ReelGeneratorConfig`]
#[derive(Debug)]
pub struct ReelGenerator {
    id: String,
    strip_len: usize,
    weights: WeightTable<u32>,
    limits: HashMap<u32, Vec<usize>>,
    quotas: Vec<(u32, PerReel)>,
    same_spacing: usize,
    pair_spacing: HashMap<(u32, u32), usize>,
    stacks: HashMap<u32, StackRule>,
    window: usize,
    seed: u64,
}

impl ReelGenerator {
    /// Resolve symbol names and validate the rules
    pub fn new(id: &str, config: &ReelGeneratorConfig, symbols: &SymbolTable) -> Result<Self> {
        let context = format!("reel generator {id}");
        let fail = |msg: String| SlotError::ReelGeneration(format!("{id}: {msg}"));

        if config.strip_len == 0 {
            return Err(fail("strip_len must be positive".into()));
        }

        let weights = WeightTable::new(
            id,
            config
                .symbol_weights
                .iter()
                .map(|(name, w)| symbols.resolve(name, &context).map(|sym| (sym, *w)))
                .collect::<Result<Vec<_>>>()?,
        )?;
        if weights.total() <= 0.0 {
            return Err(SlotError::EmptyWeights(id.to_string()));
        }

        let limits = config
            .limit_to_reels
            .iter()
            .filter(|(_, reels)| !reels.is_empty())
            .map(|(name, reels)| -> Result<(u32, Vec<usize>)> {
                Ok((symbols.resolve(name, &context)?, reels.clone()))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let quotas = config
            .quotas
            .iter()
            .map(|(name, q)| -> Result<(u32, PerReel)> {
                Ok((symbols.resolve(name, &context)?, q.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let same_spacing = config.space_between_same.unwrap_or(0);
        if config.space_between_same.is_some() && !(1..=MAX_SPACING).contains(&same_spacing) {
            return Err(fail(format!(
                "space_between_same must be between 1 and {MAX_SPACING}, got {same_spacing}"
            )));
        }

        let mut pair_spacing = HashMap::new();
        for (a, others) in &config.space_between {
            let a_id = symbols.resolve(a, &context)?;
            for (b, dist) in others {
                if !(1..=MAX_SPACING).contains(dist) {
                    return Err(fail(format!(
                        "space_between {a}/{b} must be between 1 and {MAX_SPACING}, got {dist}"
                    )));
                }
                pair_spacing.insert((a_id, symbols.resolve(b, &context)?), *dist);
            }
        }

        let mut stacks = HashMap::new();
        for (name, rule) in &config.stacks {
            if rule.min > rule.max {
                return Err(fail(format!("stack min > max for {name}")));
            }
            stacks.insert(symbols.resolve(name, &context)?, rule.clone());
        }

        let window = pair_spacing
            .values()
            .copied()
            .chain(std::iter::once(same_spacing))
            .max()
            .unwrap_or(0);

        Ok(Self {
            id: id.to_string(),
            strip_len: config.strip_len,
            weights,
            limits,
            quotas,
            same_spacing,
            pair_spacing,
            stacks,
            window,
            seed: config.seed,
        })
    }

    /// Generate `reel_count` strips
    pub fn generate(&self, reel_count: usize) -> Result<ReelSet> {
        let mut rng = SeededRng::new(self.seed);
        let reels = (0..reel_count)
            .map(|reel| self.generate_reel(reel, &mut rng))
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "generated reel set {} ({} reels × {} stops)",
            self.id,
            reel_count,
            self.strip_len
        );
        Ok(ReelSet::new(self.id.clone(), reels))
    }

    fn generate_reel(&self, reel: usize, rng: &mut dyn RandomSource) -> Result<Vec<u32>> {
        let len = self.strip_len;
        let mut strip: Vec<Option<u32>> = vec![None; len];

        self.place_quotas(reel, &mut strip, rng)?;

        let mut pos = 0;
        while pos < len {
            if strip[pos].is_some() {
                pos += 1;
                continue;
            }

            let mut chosen = *self.weights.pick(rng)?;

            if let Some(rule) = self.stack_rule(chosen, reel) {
                if self.is_allowed(chosen, reel) && roll_percent(rng) <= rule.0 {
                    let size = rng.random_float(rule.1 as f64, rule.2 as f64).round().max(1.0) as usize;
                    let placed = place_stack(&mut strip, chosen, pos, size);
                    if placed > 0 {
                        pos += placed;
                        continue;
                    }
                }
            }

            let mut tries = 0;
            while !self.is_allowed(chosen, reel) || self.violates_spacing(&strip, chosen, pos) {
                tries += 1;
                if tries > MAX_FILL_TRIES {
                    return Err(SlotError::ReelGeneration(format!(
                        "{}: could not fill reel {reel} position {pos} after {MAX_FILL_TRIES} tries",
                        self.id
                    )));
                }
                chosen = *self.weights.pick(rng)?;
            }
            strip[pos] = Some(chosen);
            pos += 1;
        }

        strip.into_iter().collect::<Option<Vec<u32>>>().ok_or_else(|| {
            SlotError::ReelGeneration(format!("{}: reel {reel} left unfilled", self.id))
        })
    }

    fn place_quotas(&self, reel: usize, strip: &mut [Option<u32>], rng: &mut dyn RandomSource) -> Result<()> {
        let len = self.strip_len;
        let reel_quotas: Vec<(u32, f64)> = self
            .quotas
            .iter()
            .filter_map(|(sym, q)| q.for_reel(reel).filter(|q| *q > 0.0).map(|q| (*sym, q)))
            .collect();

        let total: f64 = reel_quotas.iter().map(|(_, q)| q).sum();
        if total > 100.0 {
            return Err(SlotError::ReelGeneration(format!(
                "{}: quotas for reel {reel} exceed 100%",
                self.id
            )));
        }

        for (sym, quota) in reel_quotas {
            let target = ((len as f64 * quota / 100.0).floor() as usize).max(1);
            let mut remaining = target;
            let mut attempts = 0;
            while remaining > 0 {
                attempts += 1;
                if attempts > len * 10 {
                    return Err(SlotError::ReelGeneration(format!(
                        "{}: placed only {} of {target} quota symbols on reel {reel}",
                        self.id,
                        target - remaining
                    )));
                }

                let pos = rng.random_float(0.0, (len - 1) as f64).round() as usize;
                let mut placed = 0;
                if let Some((chance, min, max)) = self.stack_rule(sym, reel) {
                    if self.is_allowed(sym, reel) && roll_percent(rng) <= chance {
                        let size = rng.random_float(min as f64, max as f64).round() as usize;
                        placed = place_stack(strip, sym, pos, size.min(remaining));
                    }
                }
                if placed == 0
                    && strip[pos].is_none()
                    && self.is_allowed(sym, reel)
                    && !self.violates_spacing(strip, sym, pos)
                {
                    strip[pos] = Some(sym);
                    placed = 1;
                }
                remaining -= placed.min(remaining);
            }
        }
        Ok(())
    }

    fn is_allowed(&self, symbol: u32, reel: usize) -> bool {
        self.limits
            .get(&symbol)
            .is_none_or(|reels| reels.contains(&reel))
    }

    /// (chance, min, max) for a stacking symbol on `reel`
    fn stack_rule(&self, symbol: u32, reel: usize) -> Option<(f64, u32, u32)> {
        let rule = self.stacks.get(&symbol)?;
        let chance = rule.chance.for_reel(reel).unwrap_or(0.0);
        (chance > 0.0).then_some((chance, rule.min, rule.max))
    }

    fn violates_spacing(&self, strip: &[Option<u32>], symbol: u32, target: usize) -> bool {
        let len = strip.len();
        let window = self.window.min(len / 2);
        for dist in 1..=window {
            for pos in [(target + dist) % len, (target + len - dist) % len] {
                let Some(placed) = strip[pos] else { continue };
                if self.same_spacing >= dist && placed == symbol {
                    return true;
                }
                let forward = self.pair_spacing.get(&(symbol, placed)).copied().unwrap_or(0);
                let reverse = self.pair_spacing.get(&(placed, symbol)).copied().unwrap_or(0);
                if forward >= dist || reverse >= dist {
                    return true;
                }
            }
        }
        false
    }
}

/// Percentage roll in 1..=100
fn roll_percent(rng: &mut dyn RandomSource) -> f64 {
    rng.random_float(1.0, 100.0).round()
}

/// Fill up to `size` empty positions starting at `start`, stopping at the
/// first occupied one. Returns the number placed.
fn place_stack(strip: &mut [Option<u32>], symbol: u32, start: usize, size: usize) -> usize {
    let len = strip.len();
    let mut placed = 0;
    for offset in 0..size.min(len) {
        let idx = (start + offset) % len;
        if strip[idx].is_some() {
            break;
        }
        strip[idx] = Some(symbol);
        placed += 1;
    }
    placed
}
