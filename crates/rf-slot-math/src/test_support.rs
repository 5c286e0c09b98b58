//! Compact game used by unit tests

use crate::config::GameConfig;

const BASE_STRIP: &str = "[S, A, B, C, D, A, SS, B, C, D, A, B]";
const BONUS_STRIP: &str = "[S, A, W, C, D, B, A, C, W, B, D, A, C, B, D, SS, A, B, W, C, D, A, B, C, D, W, A, B, C, D]";

fn reels(strip: &str) -> String {
    (0..5).map(|_| format!("      - {strip}\n")).collect()
}

/// 5×3 game with one S and one SS per strip, far enough apart that no
/// window can show both or a duplicate
pub(crate) fn compact_yaml(max_draw_attempts: u32) -> String {
    format!(
        r#"
game:
  id: compact
  name: Compact
  max_win_x: 100
  max_draw_attempts: {max_draw_attempts}
grid:
  reels: 5
  rows: 3
symbols:
  - {{ name: S, kind: scatter }}
  - {{ name: SS, kind: super_scatter }}
  - {{ name: W, kind: wild, pays: {{ 3: 2, 4: 5, 5: 10 }} }}
  - {{ name: A, pays: {{ 3: 1, 4: 2, 5: 4 }} }}
  - {{ name: B, pays: {{ 3: 0.5, 4: 1, 5: 2 }} }}
  - {{ name: C, pays: {{ 3: 0.4, 4: 0.8, 5: 1.5 }} }}
  - {{ name: D, pays: {{ 3: 0.2, 4: 0.5, 5: 1 }} }}
free_spins:
  basegame: {{ 3: 10, 4: 12, 5: 15 }}
  freespins: {{ 3: 6, 4: 8, 5: 10 }}
scatter_weights:
  default: freespins
  buckets:
    freespins: {{ 3: 70, 4: 25, 5: 5 }}
    superFreespins: {{ 3: 70, 4: 15, 5: 3 }}
    maxwin: {{ 4: 1, 5: 2 }}
reel_sets:
  base:
    reels:
{base}  bonus:
    reels:
{bonus}modes:
  base:
    cost: 1
    result_sets:
      - criteria: "0"
        quota: 0.4
        multiplier: 0
        reel_weights:
          basegame: {{ base: 1 }}
          freespins: {{ bonus: 1 }}
      - criteria: basegame
        quota: 0.4
        reel_weights:
          basegame: {{ base: 1 }}
          freespins: {{ bonus: 1 }}
      - criteria: freespins
        quota: 0.1
        force_free_spins: true
        reel_weights:
          basegame: {{ base: 1 }}
          freespins: {{ bonus: 1 }}
      - criteria: superFreespins
        quota: 0.05
        force_free_spins: true
        flags: {{ force_super_free_spins: true }}
        reel_weights:
          basegame: {{ base: 1 }}
          freespins: {{ bonus: 1 }}
      - criteria: freespinsUpgradeToSuper
        quota: 0.05
        force_free_spins: true
        flags: {{ upgrade_free_spins: true }}
        check: free_spins_upgraded
        reel_weights:
          basegame: {{ base: 1 }}
          freespins: {{ bonus: 1 }}
"#,
        base = reels(BASE_STRIP),
        bonus = reels(BONUS_STRIP),
    )
}

pub(crate) fn compact_game() -> GameConfig {
    GameConfig::from_yaml_str(&compact_yaml(5_000)).unwrap()
}
