//! Round Math Benchmarks
//!
//! Payline evaluation, constrained board draws and full rounds on the
//! reference game.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rf_slot_math::{
    Board, BoardGenerator, Book, GameConfig, LedgerWallet, RoundContext, RoundEngine, RoundState, SeededRng,
};

const LINES_EXAMPLE: &str = include_str!("../../../games/lines_example.yaml");

fn game() -> GameConfig {
    GameConfig::from_yaml_str(LINES_EXAMPLE).expect("reference game")
}

/// Benchmark payline evaluation on pre-drawn boards
fn bench_paylines(c: &mut Criterion) {
    let game = game();
    let mode = game.mode("base").expect("base mode");
    let generator = BoardGenerator::new(&game, mode);
    let rs = mode.result_set("basegame").expect("basegame");

    let mut rng = SeededRng::new(42);
    let boards: Vec<Board> = (0..256)
        .map(|_| generator.draw(&RoundState::new(), rs, &mut rng).expect("draw").board)
        .collect();

    let mut group = c.benchmark_group("paylines");
    group.throughput(Throughput::Elements(boards.len() as u64));
    group.bench_function("evaluate_256_boards", |b| {
        b.iter(|| {
            let total: f64 = boards
                .iter()
                .map(|board| game.paytable.evaluate(&board.grid, &game.symbols).total)
                .sum();
            black_box(total)
        })
    });
    group.finish();
}

/// Benchmark board draws per scenario
fn bench_board_draw(c: &mut Criterion) {
    let game = game();
    let mode = game.mode("base").expect("base mode");
    let generator = BoardGenerator::new(&game, mode);

    let mut group = c.benchmark_group("board_draw");
    for criteria in ["basegame", "freespins", "superFreespins"] {
        let rs = mode.result_set(criteria).expect("criteria");
        let mut rng = SeededRng::new(7);
        group.bench_with_input(BenchmarkId::new("draw", criteria), &criteria, |b, _| {
            b.iter(|| black_box(generator.draw(&RoundState::new(), rs, &mut rng).expect("draw")))
        });
    }
    group.finish();
}

/// Benchmark whole rounds including free-spin sessions
fn bench_round(c: &mut Criterion) {
    let game = game();
    let engine = RoundEngine::new(&game, "bonus").expect("bonus mode");
    let rs = engine.mode().result_set("freespins").expect("freespins");

    let mut round_id = 0u64;
    c.bench_function("round/bonus_freespins", |b| {
        b.iter(|| {
            round_id += 1;
            let mut state = RoundState::new();
            let mut rng = SeededRng::for_round(99, round_id);
            let mut wallet = LedgerWallet::new();
            let mut book = Book::new(round_id, "freespins");
            let outcome = engine
                .play_round(&mut RoundContext {
                    state: &mut state,
                    rng: &mut rng,
                    wallet: &mut wallet,
                    book: &mut book,
                    result_set: rs,
                })
                .expect("round");
            black_box(outcome.total_payout)
        })
    });
}

criterion_group!(benches, bench_paylines, bench_board_draw, bench_round);
criterion_main!(benches);
