//! Injected randomness for dice, card shuffles and procedural terrain

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Uniform random source used by every random draw in the engine
pub trait RandomSource {
    /// Uniform die roll in 1..=6
    fn roll_d6(&mut self) -> u8;

    /// Uniform index in 0..bound. `bound` must be non-zero.
    fn index(&mut self, bound: usize) -> usize;

    /// Uniform float in [0, 1)
    fn unit(&mut self) -> f64;
}

/// Fisher-Yates shuffle driven by a [`RandomSource`]
pub fn shuffle<T, S: RandomSource + ?Sized>(items: &mut [T], source: &mut S) {
    for i in (1..items.len()).rev() {
        let j = source.index(i + 1);
        items.swap(i, j);
    }
}

/// Adapter from any `rand` generator
#[derive(Clone, Debug)]
pub struct RngSource<R>(pub R);

impl RngSource<ChaCha8Rng> {
    /// Reproducible source from a seed
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn roll_d6(&mut self) -> u8 {
        self.0.gen_range(1..=6)
    }

    fn index(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }

    fn unit(&mut self) -> f64 {
        self.0.gen()
    }
}

/// Replays a fixed die sequence, cycling when exhausted.
///
/// Shuffles and index draws always pick 0, which leaves slices in their
/// original order apart from a deterministic rotation; `unit` returns 0.5.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    rolls: VecDeque<u8>,
    played: Vec<u8>,
}

impl ScriptedSource {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        let rolls: VecDeque<u8> = rolls.into_iter().map(|r| r.clamp(1, 6)).collect();
        Self {
            rolls,
            played: Vec::new(),
        }
    }

    /// Source that always rolls `value`
    pub fn constant(value: u8) -> Self {
        Self::new([value])
    }

    /// Dice rolled so far
    pub fn played(&self) -> &[u8] {
        &self.played
    }
}

impl RandomSource for ScriptedSource {
    fn roll_d6(&mut self) -> u8 {
        let roll = match self.rolls.pop_front() {
            Some(roll) => {
                self.rolls.push_back(roll);
                roll
            }
            None => 1,
        };
        self.played.push(roll);
        roll
    }

    fn index(&mut self, _bound: usize) -> usize {
        0
    }

    fn unit(&mut self) -> f64 {
        0.5
    }
}
