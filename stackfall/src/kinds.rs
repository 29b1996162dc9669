//! Sources of piece kinds
//!
//! The engine never touches global randomness: it asks a [`KindSource`] for
//! the next kind, so games can be seeded or replayed from a fixed sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::piece::PieceKind;

/// Provider of the next piece kind
pub trait KindSource {
    fn next_kind(&mut self) -> PieceKind;
}

// Any closure returning kinds is a source
impl<F> KindSource for F
where
    F: FnMut() -> PieceKind,
{
    fn next_kind(&mut self) -> PieceKind {
        self()
    }
}

/// Uniformly random kinds
#[derive(Debug)]
pub struct RandomKinds<R: Rng = StdRng> {
    rng: R,
}

impl RandomKinds<StdRng> {
    /// Random kinds seeded from the operating system
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Reproducible random kinds
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomKinds<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomKinds<R> {
    pub fn from_rng(rng: R) -> Self {
        RandomKinds { rng }
    }
}

impl<R: Rng> KindSource for RandomKinds<R> {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())]
    }
}

/// Kinds from a fixed list, repeated forever
#[derive(Debug, Clone)]
pub struct SequenceKinds {
    kinds: Vec<PieceKind>,
    next: usize,
}

impl SequenceKinds {
    /// Panics if `kinds` is empty
    pub fn new(kinds: Vec<PieceKind>) -> Self {
        assert!(!kinds.is_empty(), "kind sequence must not be empty");
        SequenceKinds { kinds, next: 0 }
    }

    /// The same kind every time
    pub fn repeat(kind: PieceKind) -> Self {
        Self::new(vec![kind])
    }
}

impl KindSource for SequenceKinds {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.next];
        self.next = (self.next + 1) % self.kinds.len();
        kind
    }
}
