//! Seeded random word source shared by the random-extension oracles

use crate::shared::models::Symbol;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct WordSampler {
    rng: StdRng,
    min_length: usize,
    max_length: usize,
}

impl WordSampler {
    /// Same seed and bounds, same word sequence
    pub fn new(seed: u64, min_length: usize, max_length: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_length: min_length.min(max_length),
            max_length,
        }
    }

    /// Random word with length in `min_length..=max_length`
    pub fn word(&mut self, alphabet: &[Symbol]) -> Vec<Symbol> {
        if alphabet.is_empty() {
            return Vec::new();
        }
        let len = self.rng.random_range(self.min_length..=self.max_length);
        (0..len)
            .map(|_| alphabet[self.rng.random_range(0..alphabet.len())])
            .collect()
    }

    /// `prefix` followed by a random word
    pub fn extend(&mut self, prefix: &[Symbol], alphabet: &[Symbol]) -> Vec<Symbol> {
        let mut word = prefix.to_vec();
        word.extend(self.word(alphabet));
        word
    }
}
