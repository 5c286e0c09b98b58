//! Criteria assignment: which result set each simulated round plays

use std::collections::BTreeMap;

use rf_slot_math::{RandomSource, ResultSet, SeededRng, WeightTable};

use crate::error::{Result, SimError};

/// Assign a result set index to each of `rounds` rounds.
///
/// Every result set gets at least one round; the rest follow the normalized
/// quotas. Rounding leftovers are settled by weighted ±1 steps, then the
/// order is shuffled. The assignment depends only on `seed`.
pub fn assign_criteria(result_sets: &[ResultSet], rounds: u64, seed: u64) -> Result<Vec<usize>> {
    if result_sets.is_empty() {
        return Err(SimError::Settings("no result sets to assign".into()));
    }
    if rounds < result_sets.len() as u64 {
        return Err(SimError::Settings(format!(
            "{rounds} rounds cannot cover {} result sets",
            result_sets.len()
        )));
    }

    let total_quota: f64 = result_sets.iter().map(|rs| rs.quota).sum();
    if total_quota <= 0.0 {
        return Err(SimError::Settings("result set quotas sum to zero".into()));
    }

    let mut counts: Vec<u64> = result_sets
        .iter()
        .map(|rs| ((rs.quota / total_quota * rounds as f64).floor() as u64).max(1))
        .collect();

    let mut rng = SeededRng::new(seed);
    let weights = WeightTable::new(
        "criteria quotas",
        result_sets.iter().enumerate().map(|(i, rs)| (i, rs.quota / total_quota)),
    )?;

    let mut assigned: u64 = counts.iter().sum();
    while assigned < rounds {
        counts[*weights.pick(&mut rng)?] += 1;
        assigned += 1;
    }
    while assigned > rounds {
        let idx = *weights.pick(&mut rng)?;
        if counts[idx] > 1 {
            counts[idx] -= 1;
            assigned -= 1;
        }
    }

    let mut order: Vec<usize> = counts
        .iter()
        .enumerate()
        .flat_map(|(idx, &n)| std::iter::repeat_n(idx, n as usize))
        .collect();
    for i in (1..order.len()).rev() {
        let j = rng.random_index(i + 1);
        order.swap(i, j);
    }

    log::debug!(
        "assigned {} rounds over {} criteria",
        order.len(),
        result_sets.len()
    );
    Ok(order)
}

/// Rounds per criteria key
pub fn criteria_counts(result_sets: &[ResultSet], assignment: &[usize]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for &idx in assignment {
        if let Some(rs) = result_sets.get(idx) {
            *counts.entry(rs.criteria.clone()).or_default() += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_slot_math::ReelWeights;

    fn result_sets(quotas: &[(&str, f64)]) -> Vec<ResultSet> {
        let table = || WeightTable::new("reels", [("r".to_string(), 1.0)]).unwrap();
        quotas
            .iter()
            .map(|(c, q)| ResultSet::new(*c, *q, ReelWeights::new(table(), table())))
            .collect()
    }

    #[test]
    fn test_counts_sum_to_rounds() {
        let sets = result_sets(&[("0", 0.4), ("basegame", 0.4), ("freespins", 0.1), ("maxwin", 0.0005)]);
        for rounds in [4, 7, 100, 1001, 10_000] {
            let assignment = assign_criteria(&sets, rounds, 3).unwrap();
            assert_eq!(assignment.len() as u64, rounds);
            let counts = criteria_counts(&sets, &assignment);
            assert_eq!(counts.len(), 4, "every criteria gets a round");
            assert!(counts.values().all(|&n| n >= 1));
        }
    }

    #[test]
    fn test_quota_proportions() {
        let sets = result_sets(&[("a", 0.75), ("b", 0.25)]);
        let counts = criteria_counts(&sets, &assign_criteria(&sets, 1000, 9).unwrap());
        assert_eq!(counts["a"], 750);
        assert_eq!(counts["b"], 250);
    }

    #[test]
    fn test_deterministic_shuffle() {
        let sets = result_sets(&[("a", 0.5), ("b", 0.3), ("c", 0.2)]);
        let a = assign_criteria(&sets, 500, 42).unwrap();
        let b = assign_criteria(&sets, 500, 42).unwrap();
        let c = assign_criteria(&sets, 500, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_too_few_rounds() {
        let sets = result_sets(&[("a", 0.5), ("b", 0.5)]);
        assert!(matches!(assign_criteria(&sets, 1, 0), Err(SimError::Settings(_))));
        assert!(matches!(assign_criteria(&[], 10, 0), Err(SimError::Settings(_))));
    }
}
