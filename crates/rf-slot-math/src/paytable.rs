//! Paylines and line-win evaluation

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::symbols::SymbolTable;

/// A payline template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Line number (1-based, as shown to players)
    pub number: u16,
    /// Row index for each reel
    pub rows: Vec<u8>,
}

impl Payline {
    pub fn new(number: u16, rows: Vec<u8>) -> Self {
        Self { number, rows }
    }

    /// One row index per reel, every index inside the grid
    pub fn validate(&self, reels: usize, rows: usize) -> Result<()> {
        if self.rows.len() != reels {
            return Err(SlotError::InvalidLine {
                line: self.number,
                reason: format!("has {} positions, grid has {reels} reels", self.rows.len()),
            });
        }
        if let Some((reel, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| **row as usize >= rows)
        {
            return Err(SlotError::InvalidLine {
                line: self.number,
                reason: format!("row {row} on reel {reel} is outside {rows} rows"),
            });
        }
        Ok(())
    }
}

/// The 15 standard lines for a 5×3 grid
pub fn standard_15_paylines() -> Vec<Payline> {
    let rows: [[u8; 5]; 15] = [
        [0, 0, 0, 0, 0],
        [1, 1, 1, 1, 1],
        [2, 2, 2, 2, 2],
        [2, 1, 0, 1, 2],
        [0, 1, 2, 1, 0],
        [2, 1, 2, 1, 2],
        [0, 1, 0, 1, 0],
        [2, 2, 1, 0, 0],
        [0, 0, 1, 2, 2],
        [1, 0, 0, 0, 1],
        [1, 2, 2, 2, 1],
        [0, 1, 1, 1, 0],
        [2, 1, 1, 1, 2],
        [1, 0, 1, 0, 1],
        [1, 2, 1, 2, 1],
    ];
    rows.iter()
        .enumerate()
        .map(|(i, r)| Payline::new(i as u16 + 1, r.to_vec()))
        .collect()
}

/// A win on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline number
    pub line: u16,
    /// Paying symbol ID (the wild when a pure wild run pays more)
    pub symbol_id: u32,
    pub symbol_name: String,
    /// Run length from the leftmost reel
    pub match_count: u8,
    /// Bet multiplier
    pub payout: f64,
    /// (reel, row) of every symbol in the run
    pub positions: Vec<(u8, u8)>,
    /// (reel, row) of the wilds in the run
    pub wild_positions: Vec<(u8, u8)>,
}

/// Line evaluation of one board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineEvaluation {
    pub wins: Vec<LineWin>,
    pub total: f64,
}

impl LineEvaluation {
    pub fn has_wins(&self) -> bool {
        !self.wins.is_empty()
    }
}

/// Validated payline table
#[derive(Debug, Clone)]
pub struct PayTable {
    lines: Vec<Payline>,
}

impl PayTable {
    /// Validate every line against the grid; line numbers must be unique
    pub fn new(lines: Vec<Payline>, reels: usize, rows: usize) -> Result<Self> {
        if lines.is_empty() {
            return Err(SlotError::Validation("no paylines defined".into()));
        }
        let mut seen = HashSet::new();
        for line in &lines {
            line.validate(reels, rows)?;
            if !seen.insert(line.number) {
                return Err(SlotError::InvalidLine {
                    line: line.number,
                    reason: "duplicate line number".into(),
                });
            }
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[Payline] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Evaluate a reel-major grid (`grid[reel][row]`)
    pub fn evaluate(&self, grid: &[Vec<u32>], symbols: &SymbolTable) -> LineEvaluation {
        let wins: Vec<LineWin> = self
            .lines
            .iter()
            .filter_map(|line| evaluate_line(line, grid, symbols))
            .collect();
        let total = wins.iter().map(|w| w.payout).sum();
        LineEvaluation { wins, total }
    }
}

fn evaluate_line(line: &Payline, grid: &[Vec<u32>], symbols: &SymbolTable) -> Option<LineWin> {
    // Lines reaching outside a short grid are skipped
    let cells: Vec<(u8, u8, u32)> = line
        .rows
        .iter()
        .enumerate()
        .map(|(reel, &row)| {
            let id = grid.get(reel)?.get(row as usize)?;
            Some((reel as u8, row, *id))
        })
        .collect::<Option<_>>()?;
    let wild = symbols.wild();
    let is_wild = |id: u32| wild == Some(id);

    let wild_run = cells.iter().take_while(|(_, _, id)| is_wild(*id)).count();
    let wild_pay = match (wild, wild_run) {
        (Some(w), n) if n > 0 => symbols.get(w).map_or(0.0, |s| s.pay(n as u8)),
        _ => 0.0,
    };

    // The anchor is the first non-wild symbol; scatters never anchor a line
    let anchor = cells
        .iter()
        .map(|(_, _, id)| *id)
        .find(|id| !is_wild(*id))
        .and_then(|id| symbols.get(id))
        .filter(|s| !s.is_scatter_class());

    let mut best: Option<(u32, usize, f64)> = None;
    if let Some(anchor) = anchor {
        let run = cells
            .iter()
            .take_while(|(_, _, id)| *id == anchor.id || is_wild(*id))
            .count();
        let pay = anchor.pay(run as u8);
        if pay > 0.0 {
            best = Some((anchor.id, run, pay));
        }
    }
    if let Some(w) = wild {
        if wild_pay > best.map_or(0.0, |(_, _, p)| p) {
            best = Some((w, wild_run, wild_pay));
        }
    }

    let (symbol_id, run, payout) = best?;
    let run_cells = &cells[..run];
    Some(LineWin {
        line: line.number,
        symbol_id,
        symbol_name: symbols.name(symbol_id).to_string(),
        match_count: run as u8,
        payout,
        positions: run_cells.iter().map(|(r, row, _)| (*r, *row)).collect(),
        wild_positions: run_cells
            .iter()
            .filter(|(_, _, id)| is_wild(*id))
            .map(|(r, row, _)| (*r, *row))
            .collect(),
    })
}
