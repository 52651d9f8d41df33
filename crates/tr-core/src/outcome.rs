//! Outcome generator: weighted sample space + near-miss bias pass

use rand::Rng;

use crate::limits::DifficultyLevel;
use crate::symbols::{OutcomeTriple, Symbol};

/// Size of the unweighted space (every ordered reel combination)
pub const BASE_SPACE_LEN: usize = Symbol::COUNT * Symbol::COUNT * Symbol::COUNT;

/// The near-miss roll is `u * NEAR_MISS_SCALE` with `u` uniform in [0, 1)
pub const NEAR_MISS_SCALE: f64 = 5.0;

/// The pass fires when the scaled roll is at or above this value (P = 0.6)
pub const NEAR_MISS_THRESHOLD: f64 = 2.0;

/// Draws spin outcomes for a difficulty level.
///
/// Stateless apart from the level: all randomness comes from the caller's
/// RNG, so a seeded RNG reproduces a sequence exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeGenerator {
    level: DifficultyLevel,
}

impl OutcomeGenerator {
    pub fn new(level: DifficultyLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    /// Number of entries in the weighted space: `125 + 5 * level`
    pub fn space_len(&self) -> usize {
        BASE_SPACE_LEN + Symbol::COUNT * self.level.get() as usize
    }

    /// Chance of drawing three of a kind straight from the space
    pub fn three_of_a_kind_probability(&self) -> f64 {
        let matches = Symbol::COUNT + Symbol::COUNT * self.level.get() as usize;
        matches as f64 / self.space_len() as f64
    }

    /// Materialize the weighted space.
    ///
    /// Base combinations come first in reel order (reel 0 slowest-varying),
    /// followed by one block of the five matching triples per level.
    pub fn sample_space(&self) -> Vec<OutcomeTriple> {
        (0..self.space_len()).map(|i| self.entry(i)).collect()
    }

    /// Entry `index` of [`Self::sample_space`] without building the vector
    fn entry(&self, index: usize) -> OutcomeTriple {
        if index < BASE_SPACE_LEN {
            let n = Symbol::COUNT;
            OutcomeTriple::new([
                Symbol::ALL[index / (n * n)],
                Symbol::ALL[(index / n) % n],
                Symbol::ALL[index % n],
            ])
        } else {
            OutcomeTriple::matching(Symbol::ALL[(index - BASE_SPACE_LEN) % Symbol::COUNT])
        }
    }

    /// Uniform draw from the weighted space, no bias pass
    pub fn draw_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> OutcomeTriple {
        self.entry(rng.random_range(0..self.space_len()))
    }

    /// Full draw: weighted space, then the near-miss pass
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> OutcomeTriple {
        let raw = self.draw_raw(rng);
        let outcome = apply_near_miss(raw, rng);
        if outcome != raw {
            log::trace!("near-miss pass rewrote {raw} -> {outcome}");
        }
        outcome
    }
}

/// Draw one outcome for `level`
pub fn draw<R: Rng + ?Sized>(level: DifficultyLevel, rng: &mut R) -> OutcomeTriple {
    OutcomeGenerator::new(level).draw(rng)
}

/// Near-miss pass.
///
/// Only all-distinct triples are touched, and only they consume a roll.
/// When the roll fires the middle reel copies the first, leaving
/// `[a, a, c]`.
pub fn apply_near_miss<R: Rng + ?Sized>(triple: OutcomeTriple, rng: &mut R) -> OutcomeTriple {
    if !triple.is_all_distinct() {
        return triple;
    }

    let roll = rng.random::<f64>() * NEAR_MISS_SCALE;
    if roll >= NEAR_MISS_THRESHOLD {
        let [first, _, last] = triple.symbols();
        OutcomeTriple::new([first, first, last])
    } else {
        triple
    }
}
