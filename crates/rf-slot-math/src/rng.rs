//! Reproducible random source
//!
//! Every draw in a round flows through [`RandomSource`]. The default
//! implementation is a ChaCha8 stream, so a seed replays the same round on
//! any platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Golden-ratio increment used to spread round ids across the seed space
const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Uniform random draws from a reproducible stream
pub trait RandomSource {
    /// Uniform float in `[low, high)`
    fn random_float(&mut self, low: f64, high: f64) -> f64;

    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f64 {
        self.random_float(0.0, 1.0)
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn random_index(&mut self, len: usize) -> usize {
        let idx = (self.unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// Seeded ChaCha8 random source
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SeededRng {
    /// Create a stream from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Derive the stream for one round of a batch.
    ///
    /// Round streams are independent of each other and of the order in
    /// which rounds execute.
    pub fn for_round(base_seed: u64, round_id: u64) -> Self {
        Self::new(derive_round_seed(base_seed, round_id))
    }

    /// Seed this stream was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRng {
    fn random_float(&mut self, low: f64, high: f64) -> f64 {
        let u: f64 = self.inner.random();
        low + u * (high - low)
    }
}

/// Seed for round `round_id` of a batch seeded with `base_seed`
pub fn derive_round_seed(base_seed: u64, round_id: u64) -> u64 {
    base_seed ^ round_id.wrapping_mul(SEED_MIX)
}
