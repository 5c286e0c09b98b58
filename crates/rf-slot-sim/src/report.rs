//! Simulation report

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::simulator::RoundRecord;

/// Per-criteria totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaStats {
    pub rounds: u64,
    /// Rounds whose result set accepted the outcome
    pub met: u64,
    pub total_win: f64,
    pub avg_win: f64,
    pub max_win: f64,
}

/// Aggregate figures of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub game: String,
    pub mode: String,
    pub seed: u64,
    pub rounds: u64,
    /// Price of one round in bet multiples
    pub cost: f64,
    pub total_cost: f64,
    pub total_win: f64,
    /// Total win over total cost
    pub rtp: f64,
    /// Share of rounds with a positive win
    pub hit_rate: f64,
    pub basegame_win: f64,
    pub freespins_win: f64,
    /// Share of rounds that entered free spins
    pub free_spin_rate: f64,
    pub max_win: f64,
    pub max_win_round: Option<u64>,
    /// Rounds kept although their criteria never accepted them
    pub unmet_rounds: u64,
    pub criteria: BTreeMap<String, CriteriaStats>,
}

impl SimulationReport {
    /// Fold round records (any order) into a report
    pub fn from_records(game: &str, mode: &str, seed: u64, cost: f64, records: &[RoundRecord]) -> Self {
        let mut report = Self {
            game: game.to_string(),
            mode: mode.to_string(),
            seed,
            rounds: records.len() as u64,
            cost,
            total_cost: cost * records.len() as f64,
            total_win: 0.0,
            rtp: 0.0,
            hit_rate: 0.0,
            basegame_win: 0.0,
            freespins_win: 0.0,
            free_spin_rate: 0.0,
            max_win: 0.0,
            max_win_round: None,
            unmet_rounds: 0,
            criteria: BTreeMap::new(),
        };

        let mut hits = 0u64;
        let mut free_spin_rounds = 0u64;
        for record in records {
            let win = record.win.total;
            report.total_win += win;
            report.basegame_win += record.win.basegame;
            report.freespins_win += record.win.freespins;
            if win > 0.0 {
                hits += 1;
            }
            if record.free_spins > 0 {
                free_spin_rounds += 1;
            }
            if !record.criteria_met {
                report.unmet_rounds += 1;
            }
            if win > report.max_win || report.max_win_round.is_none() {
                report.max_win = win;
                report.max_win_round = Some(record.id);
            }

            let stats = report.criteria.entry(record.criteria.clone()).or_default();
            stats.rounds += 1;
            stats.total_win += win;
            stats.max_win = stats.max_win.max(win);
            if record.criteria_met {
                stats.met += 1;
            }
        }

        for stats in report.criteria.values_mut() {
            stats.avg_win = stats.total_win / stats.rounds as f64;
        }
        if report.total_cost > 0.0 {
            report.rtp = report.total_win / report.total_cost;
        }
        if report.rounds > 0 {
            report.hit_rate = hits as f64 / report.rounds as f64;
            report.free_spin_rate = free_spin_rounds as f64 / report.rounds as f64;
        }
        report
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Generate text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        let title = format!("{} / {}", self.game, self.mode);
        output.push_str(&format!("{title}\n{}\n\n", "=".repeat(title.chars().count())));

        output.push_str(&format!("  Rounds:      {} (seed {})\n", self.rounds, self.seed));
        output.push_str(&format!("  Cost:        {:.2}\n", self.total_cost));
        output.push_str(&format!("  Win:         {:.2}\n", self.total_win));
        output.push_str(&format!("  RTP:         {:.4}%\n", self.rtp * 100.0));
        output.push_str(&format!("  Hit rate:    {:.2}%\n", self.hit_rate * 100.0));
        output.push_str(&format!("  FS rate:     {:.3}%\n", self.free_spin_rate * 100.0));
        output.push_str(&format!(
            "  Split:       base {:.2} / free spins {:.2}\n",
            self.basegame_win, self.freespins_win
        ));
        output.push_str(&format!("  Max win:     {:.2}x\n", self.max_win));
        if self.unmet_rounds > 0 {
            output.push_str(&format!("  Unmet:       {} rounds\n", self.unmet_rounds));
        }

        output.push_str("\nCriteria:\n");
        output.push_str(&"-".repeat(72));
        output.push('\n');
        for (name, stats) in &self.criteria {
            output.push_str(&format!(
                "  {:<32} {:>8} rounds  avg {:>10.2}  max {:>10.2}\n",
                name, stats.rounds, stats.avg_win, stats.max_win
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rf_slot_math::RoundWin;

    fn record(id: u64, criteria: &str, base: f64, fs: f64, met: bool) -> RoundRecord {
        RoundRecord {
            id,
            criteria: criteria.to_string(),
            win: RoundWin {
                total: base + fs,
                basegame: base,
                freespins: fs,
                capped: false,
            },
            criteria_met: met,
            attempts: 1,
            free_spins: if fs > 0.0 { 10 } else { 0 },
            book: None,
        }
    }

    #[test]
    fn test_aggregates() {
        let records = vec![
            record(0, "0", 0.0, 0.0, true),
            record(1, "basegame", 2.0, 0.0, true),
            record(2, "freespins", 1.0, 20.0, true),
            record(3, "maxwin", 0.0, 5.0, false),
        ];
        let report = SimulationReport::from_records("g", "base", 1, 1.0, &records);

        assert_eq!(report.rounds, 4);
        assert_relative_eq!(report.total_win, 28.0);
        assert_relative_eq!(report.rtp, 7.0);
        assert_relative_eq!(report.hit_rate, 0.75);
        assert_relative_eq!(report.free_spin_rate, 0.5);
        assert_relative_eq!(report.basegame_win, 3.0);
        assert_relative_eq!(report.freespins_win, 25.0);
        assert_eq!(report.max_win_round, Some(2));
        assert_eq!(report.unmet_rounds, 1);
        assert_eq!(report.criteria["freespins"].rounds, 1);
        assert_eq!(report.criteria["maxwin"].met, 0);
    }

    #[test]
    fn test_empty_run() {
        let report = SimulationReport::from_records("g", "base", 0, 1.0, &[]);
        assert_eq!(report.rtp, 0.0);
        assert_eq!(report.max_win_round, None);
        assert!(report.to_text().contains("g / base"));
    }
}
