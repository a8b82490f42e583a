//! Deterministic seating shuffles.
//!
//! Hosts that want a random seating order pass a seed in `RefereeConfig`.
//! The same seed always produces the same seating, which keeps replays and
//! tests reproducible.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG used for seating.
#[derive(Clone, Debug)]
pub struct SeatRng {
    inner: ChaCha8Rng,
}

impl SeatRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}
