use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ParsePieceSeedError, PieceKind};

/// Chooses pieces uniformly at random, with replacement, and keeps one piece of lookahead.
///
/// The random number generator is seeded once at construction and owned by the sequencer;
/// the same seed always yields the same sequence.
///
/// # Example
///
/// ```
/// use bitfall_engine::PieceSequencer;
///
/// let mut sequencer = PieceSequencer::new();
///
/// let next = sequencer.peek_next();
/// assert_eq!(sequencer.draw(), next);
/// ```
#[derive(Debug, Clone)]
pub struct PieceSequencer {
    rng: Pcg32,
    next: PieceKind,
}

impl Default for PieceSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed, written as 32 hex digits (most significant first) by [`Display`](fmt::Display),
/// [`FromStr`] and serde.
///
/// # Example
///
/// ```
/// use bitfall_engine::{PieceSeed, PieceSequencer};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut first = PieceSequencer::with_seed(seed);
/// let mut second = PieceSequencer::with_seed(seed.to_string().parse().unwrap());
///
/// for _ in 0..10 {
///     assert_eq!(first.draw(), second.draw());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParsePieceSeedError::InvalidLength { len: s.len() });
        }
        let num = u128::from_str_radix(s, 16)
            .map_err(|source| ParsePieceSeedError::InvalidDigit { source })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceSequencer {
    /// Creates a sequencer with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.0);
        let next = rng.random();
        Self { rng, next }
    }

    /// Returns the lookahead piece and replaces it with a fresh random one.
    pub fn draw(&mut self) -> PieceKind {
        let next = self.rng.random();
        std::mem::replace(&mut self.next, next)
    }

    /// The piece the next [`Self::draw`] will return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.next
    }
}
