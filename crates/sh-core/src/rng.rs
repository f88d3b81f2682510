//! Random number generation
//!
//! Uses seeded ChaCha RNGs for reproducibility (save/restore). Every
//! consumer draws from a named [`RngStream`] so that work whose amount of
//! randomness depends on game state (tide catch-up, for instance) cannot
//! perturb the sequences seen by unrelated systems.

use std::ops::{Deref, DerefMut};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

/// Inclusive integer range, resolved to a uniform value on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub low: i32,
    pub high: i32,
}

impl IntRange {
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// A range holding a single value
    pub const fn exactly(value: i32) -> Self {
        Self::new(value, value)
    }
}

/// Game random number generator
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Note: RNG state is not serialized - games restore with a new RNG built from the seed.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_stream(seed, 0)
    }

    /// Create an RNG on a separate ChaCha stream of the same seed
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self { rng, seed }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns 0..n-1, or 0 if n is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Signed variant of `rn2`: 0..n-1, or 0 if n <= 0
    pub fn random2(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform value in low..=high; returns `low` if the range is empty
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Average of `nrolls` rolls in low..=high, biased towards the middle
    pub fn range_avg(&mut self, low: i32, high: i32, nrolls: u32) -> i32 {
        if high <= low || nrolls == 0 {
            return low;
        }
        let span = high - low + 1;
        let mut sum = self.random2(span);
        for _ in 1..nrolls {
            sum += self.random2(span + 1);
        }
        low + sum / nrolls as i32
    }

    /// Resolve an inclusive range to a value
    pub fn resolve(&mut self, range: IntRange) -> i32 {
        self.range(range.low, range.high)
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Returns true half of the time
    pub fn coinflip(&mut self) -> bool {
        self.rn2(2) == 0
    }

    /// Returns true with probability percent/100
    pub fn percent(&mut self, percent: u32) -> bool {
        self.rn2(100) < percent
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Independent random sequences drawn from one game seed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumCount,
)]
#[repr(u8)]
pub enum RngStream {
    /// Ordinary turn-by-turn gameplay
    Gameplay = 0,
    /// Level layout generation
    LevelGen = 1,
    /// Tide simulation
    Tide = 2,
}

/// One generator per [`RngStream`] plus a stack of active streams
///
/// Draws go to the stream on top of the stack, `Gameplay` when empty.
#[derive(Debug, Clone)]
pub struct RngStreams {
    seed: u64,
    generators: Vec<GameRng>,
    stack: Vec<RngStream>,
}

impl Serialize for RngStreams {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RngStreams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(RngStreams::new(seed))
    }
}

impl RngStreams {
    pub fn new(seed: u64) -> Self {
        let generators = (0..RngStream::COUNT as u64)
            .map(|stream| GameRng::with_stream(seed, stream))
            .collect();
        Self {
            seed,
            generators,
            stack: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream that draws currently go to
    pub fn active(&self) -> RngStream {
        self.stack.last().copied().unwrap_or(RngStream::Gameplay)
    }

    /// Generator of the active stream
    pub fn current(&mut self) -> &mut GameRng {
        let stream = self.active();
        self.stream(stream)
    }

    /// Generator of a specific stream, regardless of the stack
    pub fn stream(&mut self, stream: RngStream) -> &mut GameRng {
        &mut self.generators[stream as usize]
    }

    pub fn push(&mut self, stream: RngStream) {
        self.stack.push(stream);
    }

    pub fn pop(&mut self) -> Option<RngStream> {
        self.stack.pop()
    }

    /// Activate `stream` until the returned guard is dropped
    pub fn scoped(&mut self, stream: RngStream) -> RngScope<'_> {
        self.push(stream);
        RngScope { streams: self }
    }
}

impl Default for RngStreams {
    fn default() -> Self {
        Self::new(rand::random())
    }
}

/// Guard returned by [`RngStreams::scoped`]; pops its stream on drop
#[derive(Debug)]
pub struct RngScope<'a> {
    streams: &'a mut RngStreams,
}

impl Deref for RngScope<'_> {
    type Target = GameRng;

    fn deref(&self) -> &GameRng {
        &self.streams.generators[self.streams.active() as usize]
    }
}

impl DerefMut for RngScope<'_> {
    fn deref_mut(&mut self) -> &mut GameRng {
        self.streams.current()
    }
}

impl Drop for RngScope<'_> {
    fn drop(&mut self) {
        self.streams.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rn2_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            assert!(rng.rn2(10) < 10);
        }
    }

    #[test]
    fn test_range_inclusive() {
        let mut rng = GameRng::new(42);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..1000 {
            let n = rng.range(-2, 2);
            assert!((-2..=2).contains(&n));
            seen_low |= n == -2;
            seen_high |= n == 2;
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_range_avg_bounds() {
        let mut rng = GameRng::new(7);
        for _ in 0..1000 {
            let n = rng.range_avg(0, 6, 2);
            assert!((0..=6).contains(&n));
        }
    }

    #[test]
    fn test_zero_inputs() {
        let mut rng = GameRng::new(42);
        assert_eq!(rng.rn2(0), 0);
        assert_eq!(rng.random2(-3), 0);
        assert_eq!(rng.range(5, 5), 5);
        assert_eq!(rng.range(5, 1), 5);
    }

    #[test]
    fn test_reproducibility() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);
        for _ in 0..100 {
            assert_eq!(rng1.rn2(100), rng2.rn2(100));
        }
    }

    #[test]
    fn test_streams_are_independent() {
        let mut a = RngStreams::new(99);
        let mut b = RngStreams::new(99);

        // Burn gameplay draws on one side only.
        for _ in 0..500 {
            a.current().rn2(1000);
        }

        let xs: Vec<u32> = (0..50).map(|_| a.stream(RngStream::Tide).rn2(1000)).collect();
        let ys: Vec<u32> = (0..50).map(|_| b.stream(RngStream::Tide).rn2(1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_scope_pops_on_drop() {
        let mut streams = RngStreams::new(1);
        assert_eq!(streams.active(), RngStream::Gameplay);
        {
            let mut scope = streams.scoped(RngStream::Tide);
            scope.rn2(10);
        }
        assert_eq!(streams.active(), RngStream::Gameplay);
    }

    #[test]
    fn test_serde_keeps_seed() {
        let streams = RngStreams::new(1234);
        let json = serde_json::to_string(&streams).unwrap();
        let restored: RngStreams = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed(), 1234);
    }
}
