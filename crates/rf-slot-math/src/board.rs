//! Board model: the visible grid, padding rows and anticipation flags

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reels::ReelSet;
use crate::rng::RandomSource;

/// A drawn R×H board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Visible symbols, `grid[reel][row]`
    pub grid: Vec<Vec<u32>>,
    /// Per-reel anticipation flags
    pub anticipation: Vec<bool>,
    /// Strip position of the top visible row per reel
    pub reel_stops: Vec<usize>,
    /// Strip symbols just above the window, `padding_top[reel][i]`
    pub padding_top: Vec<Vec<u32>>,
    /// Strip symbols just below the window
    pub padding_bottom: Vec<Vec<u32>>,
    /// Reel set the board was drawn from
    pub reel_set: String,
}

impl Board {
    /// Draw a board from `reel_set`.
    ///
    /// Reels listed in `forced` get their stop from the given strip position,
    /// shifted up by a random 0..rows-1 so the forced symbol can land on any
    /// visible row. Every other reel gets a uniform random stop.
    pub fn draw(
        reel_set: &ReelSet,
        rows: usize,
        pad: usize,
        forced: &BTreeMap<usize, usize>,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let reels = reel_set.reel_count();
        let mut board = Self {
            grid: Vec::with_capacity(reels),
            anticipation: vec![false; reels],
            reel_stops: Vec::with_capacity(reels),
            padding_top: Vec::with_capacity(reels),
            padding_bottom: Vec::with_capacity(reels),
            reel_set: reel_set.id.clone(),
        };

        for strip in &reel_set.reels {
            let len = strip.len() as i64;
            let stop = match forced.get(&strip.reel_index) {
                Some(&pos) => {
                    let offset = rng.random_float(0.0, (rows - 1) as f64).round() as i64;
                    (pos as i64 - offset).rem_euclid(len)
                }
                None => rng.random_index(strip.len()) as i64,
            };

            board.reel_stops.push(stop as usize);
            board
                .grid
                .push((0..rows as i64).map(|row| strip.symbol_at(stop + row)).collect());
            board
                .padding_top
                .push((1..=pad as i64).rev().map(|p| strip.symbol_at(stop - p)).collect());
            board.padding_bottom.push(
                (0..pad as i64)
                    .map(|p| strip.symbol_at(stop + rows as i64 + p))
                    .collect(),
            );
        }

        board
    }

    /// Build a board directly from a reel-major grid
    pub fn from_grid(grid: Vec<Vec<u32>>) -> Self {
        let reels = grid.len();
        Self {
            grid,
            anticipation: vec![false; reels],
            reel_stops: vec![0; reels],
            padding_top: vec![Vec::new(); reels],
            padding_bottom: vec![Vec::new(); reels],
            reel_set: String::new(),
        }
    }

    pub fn reels(&self) -> usize {
        self.grid.len()
    }

    pub fn rows(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn symbol(&self, reel: usize, row: usize) -> Option<u32> {
        self.grid.get(reel).and_then(|r| r.get(row)).copied()
    }

    /// Occurrences of `symbol` on the visible board
    pub fn count(&self, symbol: u32) -> usize {
        self.grid.iter().map(|reel| count_in(reel, symbol)).sum()
    }

    /// Occurrences of `symbol` per reel
    pub fn count_per_reel(&self, symbol: u32) -> Vec<usize> {
        self.grid.iter().map(|reel| count_in(reel, symbol)).collect()
    }

    /// True if any single reel shows `symbol` more than once
    pub fn has_duplicate_on_reel(&self, symbol: u32) -> bool {
        self.grid.iter().any(|reel| count_in(reel, symbol) > 1)
    }

    /// True if reel `reel` shows any of `symbols`
    pub fn reel_contains_any(&self, reel: usize, symbols: &[u32]) -> bool {
        self.grid
            .get(reel)
            .is_some_and(|r| r.iter().any(|s| symbols.contains(s)))
    }

    pub fn clear_anticipation(&mut self) {
        self.anticipation.iter_mut().for_each(|a| *a = false);
    }
}

fn count_in(reel: &[u32], symbol: u32) -> usize {
    reel.iter().filter(|s| **s == symbol).count()
}
