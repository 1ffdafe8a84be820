//! Deterministic random number generation for replayable games.
//!
//! A game has exactly one seed. Each turn draws from its own ChaCha8 stream
//! keyed by that seed and the turn number, so:
//!
//! - the same seed and moves always produce the same boards
//! - a turn can be replayed without replaying the turns before it
//! - nothing outside the pipeline (e.g. parallel move collection) can
//!   advance the generator
//!
//! ```
//! use snake_rules::engine::GameRng;
//!
//! let mut a = GameRng::for_turn(42, 7);
//! let mut b = GameRng::for_turn(42, 7);
//! assert_eq!(a.gen_range(0..100), b.gen_range(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Generator for the base stream of a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generator for the draws made while resolving `turn`.
    ///
    /// Turn 0 is the board setup.
    #[must_use]
    pub fn for_turn(seed: u64, turn: i32) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(seed);
        inner.set_stream(u64::from(turn.unsigned_abs()) + 1);
        Self { inner }
    }

    /// Independent stream for a named purpose that must not depend on the
    /// turn (e.g. the royale shrink sequence, which is replayed from the
    /// start every turn).
    #[must_use]
    pub fn for_context(seed: u64, context: &str) -> Self {
        // FNV-1a, stable across builds unlike std's DefaultHasher
        let context_seed = context
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64 ^ seed, |acc, b| {
                (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
        }
    }

    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    pub fn gen_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// True with `percent`/100 probability. Values outside 0..=100 clamp.
    pub fn chance(&mut self, percent: i32) -> bool {
        percent > 0 && self.inner.gen_range(0..100) < percent
    }

    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::for_turn(42, 3);
        let mut rng2 = GameRng::for_turn(42, 3);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range(0..1000), rng2.gen_range(0..1000));
        }
    }

    #[test]
    fn test_turns_use_different_streams() {
        let mut rng1 = GameRng::for_turn(42, 1);
        let mut rng2 = GameRng::for_turn(42, 2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_range(0..1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_range(0..1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_range(0..1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_range(0..1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_context_is_deterministic() {
        let mut ctx1 = GameRng::for_context(42, "royale");
        let mut ctx2 = GameRng::for_context(42, "royale");
        let mut other = GameRng::for_context(42, "food");

        let seq1: Vec<_> = (0..10).map(|_| ctx1.gen_range(0..1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| ctx2.gen_range(0..1000)).collect();
        let seq3: Vec<_> = (0..10).map(|_| other.gen_range(0..1000)).collect();

        assert_eq!(seq1, seq2);
        assert_ne!(seq1, seq3);
    }

    #[test]
    fn test_chance_bounds() {
        let mut rng = GameRng::new(7);
        for _ in 0..100 {
            assert!(!rng.chance(0));
            assert!(rng.chance(100));
        }
    }

    #[test]
    fn test_choose() {
        let mut rng = GameRng::new(42);
        let items = vec![1, 2, 3, 4, 5];

        let chosen = rng.choose(&items);
        assert!(items.contains(chosen.unwrap()));

        let empty: Vec<i32> = vec![];
        assert!(rng.choose(&empty).is_none());
    }
}
