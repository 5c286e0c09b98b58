//! Weighted sampling
//!
//! [`WeightTable`] keeps its entries in a fixed order so a given random
//! stream always selects the same outcome. [`ScatterWeights`] groups tables
//! into named buckets selected by a round's criteria key.

use std::collections::BTreeMap;

use crate::error::{Result, SlotError};
use crate::rng::RandomSource;

/// Outcome keys with non-negative weights, walked cumulatively
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable<K> {
    name: String,
    entries: Vec<(K, f64)>,
    total: f64,
}

impl<K> WeightTable<K> {
    /// Build a table. Negative or non-finite weights are rejected.
    pub fn new(name: impl Into<String>, entries: impl IntoIterator<Item = (K, f64)>) -> Result<Self> {
        let name = name.into();
        let entries: Vec<(K, f64)> = entries.into_iter().collect();
        if let Some((_, w)) = entries.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(SlotError::InvalidWeights(format!(
                "table '{name}' has weight {w}"
            )));
        }
        let total = entries.iter().map(|(_, w)| w).sum();
        Ok(Self { name, entries, total })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in walk order
    pub fn entries(&self) -> &[(K, f64)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Probability of `entries()[idx]`
    pub fn probability(&self, idx: usize) -> f64 {
        match self.entries.get(idx) {
            Some((_, w)) if self.total > 0.0 => w / self.total,
            _ => 0.0,
        }
    }

    /// Draw one key with probability proportional to its weight
    pub fn pick(&self, rng: &mut dyn RandomSource) -> Result<&K> {
        if self.total <= 0.0 {
            return Err(SlotError::EmptyWeights(self.name.clone()));
        }

        let target = rng.unit() * self.total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (key, weight) in &self.entries {
            if *weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_positive = Some(key);
            if target < cumulative {
                return Ok(key);
            }
        }

        // Float rounding can leave target == total
        last_positive.ok_or_else(|| SlotError::EmptyWeights(self.name.clone()))
    }
}

impl<K: Ord + Clone> WeightTable<K> {
    /// Build a table from a map, in key order
    pub fn from_map(name: impl Into<String>, map: &BTreeMap<K, f64>) -> Result<Self> {
        Self::new(name, map.iter().map(|(k, w)| (k.clone(), *w)))
    }

    /// Smallest key carrying positive weight
    pub fn min_key(&self) -> Option<&K> {
        self.entries.iter().filter(|(_, w)| *w > 0.0).map(|(k, _)| k).min()
    }

    /// Largest key carrying positive weight
    pub fn max_key(&self) -> Option<&K> {
        self.entries.iter().filter(|(_, w)| *w > 0.0).map(|(k, _)| k).max()
    }
}

/// Scatter-count weight buckets, keyed by criteria
#[derive(Debug, Clone)]
pub struct ScatterWeights {
    default_key: String,
    default: WeightTable<u8>,
    named: BTreeMap<String, WeightTable<u8>>,
}

impl ScatterWeights {
    /// `default_key` must name one of `buckets`
    pub fn new(default_key: impl Into<String>, buckets: BTreeMap<String, WeightTable<u8>>) -> Result<Self> {
        let default_key = default_key.into();
        let default = buckets
            .get(&default_key)
            .cloned()
            .ok_or_else(|| SlotError::Validation(format!(
                "default scatter bucket '{default_key}' is not defined"
            )))?;
        Ok(Self {
            default_key,
            default,
            named: buckets,
        })
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Bucket for a criteria key; unknown keys fall back to the default bucket
    pub fn bucket(&self, criteria: &str) -> &WeightTable<u8> {
        match self.named.get(criteria) {
            Some(table) => table,
            None => {
                log::trace!("no scatter bucket for '{criteria}', using '{}'", self.default_key);
                &self.default
            }
        }
    }

    /// Draw a scatter count for `criteria`
    pub fn sample(&self, criteria: &str, rng: &mut dyn RandomSource) -> Result<u8> {
        self.bucket(criteria).pick(rng).copied()
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }
}

/// Uniform pick from a slice
pub fn pick_item<'a, T>(items: &'a [T], rng: &mut dyn RandomSource) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_index(items.len()))
}
