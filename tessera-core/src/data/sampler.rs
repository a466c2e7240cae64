//! Cyclic sampling over a fixed shuffle
//!
//! Each subset owns one permutation, built once, and a cursor that walks it
//! with wraparound. Draw order is deterministic given the permutation: a full
//! pass visits every index once, then the same sequence repeats.

use rand::seq::SliceRandom;
use rand::Rng;

/// Stateful cursor over a fixed permutation of `[0, len)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicSampler {
    permutation: Vec<usize>,
    cursor: usize,
}

impl CyclicSampler {
    /// Wrap an existing permutation, cursor at position 0.
    ///
    /// # Panics
    /// Panics if `permutation` is empty.
    pub fn new(permutation: Vec<usize>) -> Self {
        assert!(!permutation.is_empty(), "cyclic sampler needs at least one index");
        Self {
            permutation,
            cursor: 0,
        }
    }

    /// Fisher-Yates shuffle of `[0, len)`
    pub fn shuffled<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut permutation: Vec<usize> = (0..len).collect();
        permutation.shuffle(rng);
        Self::new(permutation)
    }

    /// Index at the cursor, then advance by one modulo the length
    pub fn next_index(&mut self) -> usize {
        let index = self.permutation[self.cursor];
        self.cursor = (self.cursor + 1) % self.permutation.len();
        index
    }

    /// Draw `n` indices, wrapping as often as needed
    pub fn draw(&mut self, n: usize) -> Vec<usize> {
        (0..n).map(|_| self.next_index()).collect()
    }

    /// Current cursor position within the permutation
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }
}

/// Never ends; wraps at the end of the permutation
impl Iterator for CyclicSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        Some(self.next_index())
    }
}
