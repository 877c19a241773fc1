//! Deterministic per-game random number generation.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence, so a game
//!   replays exactly given the same seed and commands
//! - **Forkable**: Independent streams for drivers that must not perturb
//!   the game's own randomness
//! - **Serializable**: O(1) state capture and restore
//!
//! ## Usage
//!
//! ```
//! use tavern::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//!
//! // A driver gets its own stream
//! let mut driver = rng.fork();
//! assert_ne!(rng.gen_below(1_000_000), driver.gen_below(1_000_000));
//!
//! // Same seed, same fork counter, same sequence
//! let mut rng2 = GameRng::new(42);
//! let mut driver2 = rng2.fork();
//! assert_eq!(driver.state().seed, driver2.state().seed);
//! # let _ = driver2.gen_below(10);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG owned by a single game instance.
///
/// Uses ChaCha8 for speed. Every random decision made during resolution
/// (shuffles, random targets, weighted sampling) draws from this source.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Fork this RNG to create an independent, deterministic stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    pub fn gen_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.inner.gen_range(0..bound)
    }

    /// Uniform index in `range`. Panics on an empty range, like `rand`.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// `true` with the given probability, clamped to `[0, 1]`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

/// Serializable RNG state for checkpointing.
///
/// Uses ChaCha8 word position for O(1) serialization regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
    /// Fork counter for deterministic branching
    pub fork_counter: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_below(1000), rng2.gen_below(1000));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_below(1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_below(1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        let mut forked1 = rng1.fork();
        let mut forked2 = rng2.fork();

        assert_eq!(forked1.seed, forked2.seed);
        assert_eq!(forked1.gen_below(1000), forked2.gen_below(1000));
    }

    #[test]
    fn test_gen_below_zero_bound() {
        let mut rng = GameRng::new(7);
        assert_eq!(rng.gen_below(0), 0);
        assert_eq!(rng.gen_below(1), 0);
    }

    #[test]
    fn test_state_restore() {
        let mut rng = GameRng::new(42);
        for _ in 0..17 {
            rng.gen_below(100);
        }

        let saved = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_below(1000)).collect();

        let mut restored = GameRng::from_state(&saved);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_below(1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_shuffle_follows_seed() {
        let mut a: Vec<u32> = (0..30).collect();
        let mut b = a.clone();
        GameRng::new(5).shuffle(&mut a);
        GameRng::new(5).shuffle(&mut b);

        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_out_of_range_probability_is_clamped() {
        let mut rng = GameRng::new(3);
        assert!(rng.gen_bool(2.0));
        assert!(!rng.gen_bool(-1.0));
    }

    #[test]
    fn test_state_serialization() {
        let rng = GameRng::new(9);
        let state = rng.state();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameRngState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
