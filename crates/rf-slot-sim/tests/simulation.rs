//! End-to-end runs on the reference game

use std::io::{BufRead, BufReader};

use rf_slot_math::GameConfig;
use rf_slot_sim::{CriteriaPolicy, SimError, SimulationConfig, Simulator};

const LINES_EXAMPLE: &str = include_str!("../../../games/lines_example.yaml");

fn game() -> GameConfig {
    GameConfig::from_yaml_str(LINES_EXAMPLE).unwrap()
}

fn settings(threads: usize) -> SimulationConfig {
    SimulationConfig {
        max_criteria_attempts: 40,
        ..SimulationConfig::quick()
    }
    .with_rounds(150)
    .with_seed(2024)
    .with_threads(threads)
}

#[test]
fn test_report_independent_of_thread_count() {
    let game = game();
    let single = Simulator::new(&game, settings(1)).run("base").unwrap();
    let multi = Simulator::new(&game, settings(4)).run("base").unwrap();
    assert_eq!(single.report, multi.report);

    let ids: Vec<u64> = multi.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (0..150).collect::<Vec<_>>());
}

#[test]
fn test_report_figures() {
    let game = game();
    let output = Simulator::new(&game, settings(2)).run("base").unwrap();
    let report = &output.report;

    assert_eq!(report.rounds, 150);
    assert_eq!(report.criteria.values().map(|c| c.rounds).sum::<u64>(), 150);
    assert_eq!(report.criteria.len(), 7);
    approx::assert_relative_eq!(report.total_cost, 150.0);
    approx::assert_relative_eq!(report.rtp, report.total_win / report.total_cost);
    approx::assert_relative_eq!(
        report.total_win,
        report.basegame_win + report.freespins_win,
        epsilon = 1.5
    );
    assert!(report.max_win <= game.max_win_x);

    let zero = &report.criteria["0"];
    assert_eq!(zero.met, zero.rounds);
    assert_eq!(zero.total_win, 0.0);

    for record in output.records.iter().filter(|r| r.criteria == "freespins") {
        assert!(record.criteria_met);
        assert!(record.free_spins >= 10);
    }
}

#[test]
fn test_different_seed_different_run() {
    let game = game();
    let a = Simulator::new(&game, settings(2)).run("bonus").unwrap();
    let b = Simulator::new(&game, settings(2).with_seed(7)).run("bonus").unwrap();
    assert_ne!(a.report.total_win, b.report.total_win);
    approx::assert_relative_eq!(a.report.total_cost, 150.0 * 70.0);
}

#[test]
fn test_books_written_in_round_order() {
    let game = game();
    let output = Simulator::new(&game, settings(3).with_rounds(40).with_books(true))
        .run("base")
        .unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    let written = output.write_books(file.path()).unwrap();
    assert_eq!(written, 40);

    let lines: Vec<serde_json::Value> = BufReader::new(std::fs::File::open(file.path()).unwrap())
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect();
    assert_eq!(lines.len(), 40);
    for (i, book) in lines.iter().enumerate() {
        assert_eq!(book["id"], serde_json::json!(i as u64));
        assert_eq!(book["events"][0]["type"], "reveal");
        assert_eq!(book["events"].as_array().unwrap().last().unwrap()["type"], "finalWin");
    }
}

#[test]
fn test_strict_policy_reports_unmet_criteria() {
    let game = game();
    let strict = SimulationConfig {
        max_criteria_attempts: 1,
        policy: CriteriaPolicy::Strict,
        ..settings(2)
    };
    let err = Simulator::new(&game, strict).run("base").unwrap_err();
    assert!(matches!(err, SimError::CriteriaNotMet { attempts: 1, .. }), "{err}");
}

#[test]
fn test_unknown_mode() {
    let game = game();
    let err = Simulator::new(&game, settings(1)).run("turbo").unwrap_err();
    assert!(matches!(err, SimError::Slot(rf_slot_math::SlotError::UnknownMode(_))));
}
