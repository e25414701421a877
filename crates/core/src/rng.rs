//! RNG module - 7-bag random piece generation
//!
//! Each bag holds one of each piece kind, shuffled with Fisher–Yates, and is
//! drained before the next bag is generated. The random source is a strategy:
//! [`SimpleRng`] for seeded, reproducible sessions and [`EntropyRng`] when
//! no seed is configured.

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{PieceKind, MAX_NEXT_COUNT};

/// Source of uniform random integers for the bag shuffle
pub trait RandomSource: Send {
    /// Uniform value in `[0, bound)`; `bound` is never zero
    fn next_below(&mut self, bound: u32) -> u32;

    /// Fisher–Yates shuffle of a bag
    fn shuffle_kinds(&mut self, bag: &mut [PieceKind]) {
        for i in (1..bag.len()).rev() {
            let j = self.next_below((i + 1) as u32) as usize;
            bag.swap(i, j);
        }
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_below(&mut self, bound: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }
}

/// OS-seeded generator for unseeded sessions
#[derive(Debug, Clone)]
pub struct EntropyRng {
    inner: StdRng,
}

impl EntropyRng {
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRng {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.inner.gen_range(0..bound)
    }
}

/// One shuffled permutation of all seven kinds at a time
pub struct PieceBag {
    bag: [PieceKind; 7],
    bag_index: usize,
    rng: Box<dyn RandomSource>,
}

impl PieceBag {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            bag: PieceKind::ALL,
            // Start exhausted so the first draw shuffles.
            bag_index: 7,
            rng,
        }
    }

    /// Generate a new shuffled bag
    fn refill(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle_kinds(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next kind, refilling first when the bag is empty
    pub fn next_kind(&mut self) -> PieceKind {
        if self.bag_index >= self.bag.len() {
            self.refill();
        }
        let kind = self.bag[self.bag_index];
        self.bag_index += 1;
        kind
    }

    /// Kinds left in the current bag
    pub fn remaining(&self) -> usize {
        self.bag.len().saturating_sub(self.bag_index)
    }
}

impl std::fmt::Debug for PieceBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieceBag")
            .field("bag", &self.bag)
            .field("bag_index", &self.bag_index)
            .finish_non_exhaustive()
    }
}

/// Bag plus the visible next queue
#[derive(Debug)]
pub struct PieceQueue {
    bag: PieceBag,
    next: ArrayVec<PieceKind, MAX_NEXT_COUNT>,
}

impl PieceQueue {
    /// Create a queue showing `next_count` pieces (clamped to 1..=6)
    pub fn new(rng: Box<dyn RandomSource>, next_count: usize) -> Self {
        let mut bag = PieceBag::new(rng);
        let mut next = ArrayVec::new();
        for _ in 0..next_count.clamp(1, MAX_NEXT_COUNT) {
            next.push(bag.next_kind());
        }
        Self { bag, next }
    }

    /// Seeded queue for reproducible sessions
    pub fn seeded(seed: u32, next_count: usize) -> Self {
        Self::new(Box::new(SimpleRng::new(seed)), next_count)
    }

    /// Pop the front of the next queue and top it up from the bag
    pub fn draw(&mut self) -> PieceKind {
        let kind = self.next.remove(0);
        self.next.push(self.bag.next_kind());
        kind
    }

    /// The upcoming pieces, soonest first
    pub fn preview(&self) -> &[PieceKind] {
        &self.next
    }
}
