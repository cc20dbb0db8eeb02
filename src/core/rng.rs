//! Deterministic randomness carried on the board.
//!
//! The rules only need randomness in one place: when a player must draw
//! from an empty deck, their discard pile is shuffled to form a new deck.
//! The generator is seeded per match so that replays are reproducible.

use im::Vector;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG owned by a `GameState`.
///
/// Cloning the board clones the generator, so two boards derived from the
/// same ancestor produce the same shuffles.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Shuffle a persistent vector, returning the new order.
    #[must_use]
    pub fn shuffled<T: Clone>(&mut self, cards: &Vector<T>) -> Vector<T> {
        let mut buffer: Vec<T> = cards.iter().cloned().collect();
        self.shuffle(&mut buffer);
        buffer.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        rng1.shuffle(&mut a);
        rng2.shuffle(&mut b);

        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffled_keeps_elements() {
        let mut rng = GameRng::new(7);
        let cards: Vector<u32> = (1..=10).collect();

        let mut shuffled: Vec<u32> = rng.shuffled(&cards).into_iter().collect();
        shuffled.sort_unstable();

        assert_eq!(shuffled, (1..=10).collect::<Vec<_>>());
        assert_eq!(rng.seed(), 7);
    }
}
