//! Reference game loading and board-draw properties

use rf_slot_math::{
    apply_anticipation, BoardGenerator, DrawScenario, GameConfig, RoundState, SeededRng, SlotError, SpinType,
};

const LINES_EXAMPLE: &str = include_str!("../../../games/lines_example.yaml");

fn game() -> GameConfig {
    GameConfig::from_yaml_str(LINES_EXAMPLE).expect("reference game loads")
}

#[test]
fn test_reference_game_shape() {
    let game = game();
    assert_eq!(game.id, "example-01");
    assert_eq!(game.grid.reel_count(), 5);
    assert_eq!(game.grid.row_count(), 3);
    assert_eq!(game.paytable.len(), 15);
    assert_eq!(game.max_win_x, 2000.0);
    assert_eq!(game.symbols.len(), 12);

    let base = game.mode("base").unwrap();
    assert_eq!(base.result_sets.len(), 7);
    assert_eq!(base.reel_sets.len(), 5);
    assert!(!base.is_bonus_buy);

    let bonus = game.mode("bonus").unwrap();
    assert!(bonus.is_bonus_buy);
    assert_eq!(bonus.cost, 70.0);
    assert!(bonus.result_sets.iter().all(|rs| rs.force_free_spins));

    assert_eq!(game.anticipation.threshold(SpinType::BaseGame), 2);
    assert_eq!(game.anticipation.threshold(SpinType::FreeSpins), 2);
}

#[test]
fn test_generated_strips_follow_rules() {
    let game = game();
    let mode = game.mode("base").unwrap();
    let wild = game.symbols.wild().unwrap();
    let ss = game.symbols.super_scatter();

    for set in mode.reel_sets.values() {
        assert_eq!(set.reel_count(), 5);
        assert!(set.reels.iter().all(|strip| strip.len() == 250));
        assert_eq!(set.reels[0].count(wild), 0, "wild limited to reels 1-4 in {}", set.id);
    }

    // SS has zero weight on the super strips: only its quota placement remains
    let superbonus = mode.reel_set("superbonus").unwrap();
    assert!(superbonus.reels.iter().all(|strip| strip.count(ss) == 1));
}

#[test]
fn test_generation_is_reproducible() {
    let a = game();
    let b = game();
    let strips = |g: &GameConfig| g.mode("base").unwrap().reel_set("bonus1").unwrap().clone();
    assert_eq!(strips(&a), strips(&b));
}

#[test]
fn test_unknown_criteria_uses_default_bucket() {
    let game = game();
    let weights = &game.scatter_weights;
    assert_eq!(weights.default_key(), "freespins");
    assert_eq!(weights.bucket("basegame").entries(), weights.bucket("freespins").entries());
    assert_ne!(weights.bucket("maxwin").entries(), weights.bucket("freespins").entries());
}

#[test]
fn test_forced_four_scatters_with_anticipation() {
    let game = game();
    let mode = game.mode("base").unwrap();
    let generator = BoardGenerator::new(&game, mode);
    let rs = mode.result_set("freespins").unwrap();
    let (s, ss) = (game.symbols.scatter(), game.symbols.super_scatter());
    let state = RoundState::new();

    let mut checked = 0;
    for seed in 0..400 {
        let mut rng = SeededRng::new(seed);
        let drawn = generator.draw(&state, rs, &mut rng).unwrap();
        assert_eq!(drawn.scenario, DrawScenario::ForcedFreeSpins);
        if drawn.scatter_target != 4 {
            continue;
        }
        checked += 1;

        let mut board = drawn.board;
        assert_eq!(board.count(s), 4);
        assert_eq!(board.count(ss), 0);
        assert!(!board.has_duplicate_on_reel(s));

        let flagged = apply_anticipation(&mut board, &[s, ss], game.anticipation.threshold(SpinType::BaseGame));
        let second = (0..5)
            .filter(|&r| board.reel_contains_any(r, &[s, ss]))
            .nth(1)
            .unwrap();
        assert_eq!(flagged, ((second + 1)..5).collect::<Vec<_>>());
    }
    assert!(checked > 50, "only {checked} draws targeted four scatters");
}

#[test]
fn test_unconstrained_base_boards() {
    let game = game();
    let mode = game.mode("base").unwrap();
    let generator = BoardGenerator::new(&game, mode);
    let rs = mode.result_set("basegame").unwrap();
    let (s, ss) = (game.symbols.scatter(), game.symbols.super_scatter());

    for seed in 0..500 {
        let mut rng = SeededRng::new(seed);
        let board = generator.draw(&RoundState::new(), rs, &mut rng).unwrap().board;
        assert!(board.count(s) + board.count(ss) <= 2);
        assert!(board.count(ss) <= 1);
        assert!(!board.has_duplicate_on_reel(s));
        assert!(!board.has_duplicate_on_reel(ss));
    }
}

#[test]
fn test_impossible_forced_trigger_is_reported() {
    // Scatters only on two reels: three forced scatter reels can never be found
    let yaml = r#"
game: { id: broken, name: Broken, max_win_x: 100, max_draw_attempts: 50 }
symbols:
  - { name: S, kind: scatter }
  - { name: SS, kind: super_scatter }
  - { name: A, pays: { 3: 1 } }
  - { name: B, pays: { 3: 1 } }
free_spins:
  basegame: { 3: 10 }
scatter_weights:
  default: freespins
  buckets:
    freespins: { 3: 1 }
reel_sets:
  only:
    reels:
      - [S, A, B, A, B, A, SS, B]
      - [S, A, B, A, B, A, SS, B]
      - [A, B, A, B, A, B, A, B]
      - [A, B, A, B, A, B, A, B]
      - [A, B, A, B, A, B, A, B]
modes:
  base:
    cost: 1
    result_sets:
      - criteria: freespins
        quota: 1
        force_free_spins: true
        reel_weights:
          basegame: { only: 1 }
          freespins: { only: 1 }
"#;
    let game = GameConfig::from_yaml_str(yaml).unwrap();
    let mode = game.mode("base").unwrap();
    let generator = BoardGenerator::new(&game, mode);
    let rs = mode.result_set("freespins").unwrap();
    let mut rng = SeededRng::new(3);

    let err = generator.draw(&RoundState::new(), rs, &mut rng).unwrap_err();
    assert!(matches!(err, SlotError::UnsatisfiableConstraint { .. }), "{err}");
}
