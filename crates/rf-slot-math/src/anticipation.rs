//! Anticipation: suspense flags for reels that could still complete a trigger

use crate::board::Board;

/// Flag every reel after the one on which the count of scatter-bearing reels
/// reaches `threshold`.
///
/// Reels are scanned left to right. A reel is flagged when at least
/// `threshold` reels before it carry one of `scatters`; the reel that reaches
/// the threshold is not flagged itself. Returns the flagged reel indices.
pub fn apply_anticipation(board: &mut Board, scatters: &[u32], threshold: u8) -> Vec<usize> {
    board.clear_anticipation();

    let mut seen = 0usize;
    let mut flagged = Vec::new();
    for reel in 0..board.reels() {
        if seen >= threshold as usize {
            board.anticipation[reel] = true;
            flagged.push(reel);
        }
        if board.reel_contains_any(reel, scatters) {
            seen += 1;
        }
    }
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: u32 = 0;
    const SS: u32 = 1;

    fn board(reels: &[[u32; 3]]) -> Board {
        Board::from_grid(reels.iter().map(|r| r.to_vec()).collect())
    }

    #[test]
    fn test_flags_after_second_scatter_reel() {
        let mut b = board(&[[5, S, 5], [5, 5, 5], [SS, 5, 5], [5, 5, 5], [5, 5, S]]);
        let flagged = apply_anticipation(&mut b, &[S, SS], 2);
        assert_eq!(flagged, vec![3, 4]);
        assert_eq!(b.anticipation, vec![false, false, false, true, true]);
    }

    #[test]
    fn test_no_flags_below_threshold() {
        let mut b = board(&[[5, S, 5], [5, 5, 5], [5, 5, 5], [5, 5, 5], [5, 5, 5]]);
        assert!(apply_anticipation(&mut b, &[S, SS], 2).is_empty());
        assert!(b.anticipation.iter().all(|a| !a));
    }

    #[test]
    fn test_multiple_on_one_reel_counts_once() {
        let mut b = board(&[[S, S, 5], [5, 5, 5], [5, 5, 5], [5, 5, 5], [5, 5, 5]]);
        assert!(apply_anticipation(&mut b, &[S, SS], 2).is_empty());
    }

    #[test]
    fn test_zero_threshold_flags_everything() {
        let mut b = board(&[[5, 5, 5], [5, 5, 5]]);
        assert_eq!(apply_anticipation(&mut b, &[S], 0), vec![0, 1]);
    }

    #[test]
    fn test_previous_flags_cleared() {
        let mut b = board(&[[5, 5, 5], [5, 5, 5], [5, 5, 5]]);
        b.anticipation = vec![true; 3];
        apply_anticipation(&mut b, &[S, SS], 2);
        assert_eq!(b.anticipation, vec![false; 3]);
    }
}
