//! Core data types: sizes, splittable seeds, and run configuration.

use std::fmt;

/// Size parameter for controlling test data generation.
///
/// Size ranges from 0 to 99, where larger values generate more complex
/// test data. The exploration loop advances it one step per passing test,
/// wrapping back to 0 at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// The next size in the growing search: one larger, wrapping at 100.
    pub fn next_cycle(&self) -> Self {
        Size((self.0 + 1) % 100)
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic test generation.
///
/// Seeds can be split to create independent random streams, ensuring
/// deterministic and reproducible runs. Every draw returns the successor
/// state; the seed itself is never mutated, so an earlier state can be
/// reused to reproduce a prior draw exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Generate the next random value and advance the seed.
    /// Uses SplitMix64 algorithm for high-quality randomness.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a bounded random value [0, bound).
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, new_seed) = self.next_u64();
        ((value as u128 * bound as u128 >> 64) as u64, new_seed)
    }

    /// Generate a uniform value in the inclusive range [min, max].
    pub fn next_in_range(self, min: i64, max: i64) -> (i64, Self) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let span = max as i128 - min as i128 + 1;
        if span > u64::MAX as i128 {
            // The full i64 domain; a raw draw is already uniform over it.
            let (value, new_seed) = self.next_u64();
            return (value as i64, new_seed);
        }
        let (offset, new_seed) = self.next_bounded(span as u64);
        ((min as i128 + offset as i128) as i64, new_seed)
    }

    /// Generate a random bool.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, new_seed) = self.next_u64();
        (value & 1 == 1, new_seed)
    }

    /// Generate a random seed from system entropy.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen(), rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// Configuration for a property check run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root seed; `None` means derive one from system entropy.
    pub seed: Option<Seed>,

    /// Initial size (0..=99); `None` means start at 0.
    pub size: Option<usize>,

    /// Number of growing-search iterations to run.
    pub iterations: usize,

    /// Maximum number of shrink candidates checked while descending.
    pub shrink_limit: usize,

    /// Maximum number of discarded draws before giving up.
    pub discard_limit: usize,

    /// A recorded shrink path (`:`-joined child indices) to replay instead
    /// of searching. Requires `seed` and `size` to be set.
    pub reproduction_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: None,
            size: None,
            iterations: 100,
            shrink_limit: 1000,
            discard_limit: 100,
            reproduction_path: None,
        }
    }
}

impl Config {
    /// Create a new config with the given root seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(Seed::from_u64(seed));
        self
    }

    /// Create a new config with an exact seed state, as printed in a
    /// failure report. Used to replay a recorded counterexample.
    pub fn with_exact_seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a new config with the given initial size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Create a new config with the given iteration budget.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Create a new config with the given shrink limit.
    pub fn with_shrink_limit(mut self, shrinks: usize) -> Self {
        self.shrink_limit = shrinks;
        self
    }

    /// Create a new config with the given discard limit.
    pub fn with_discard_limit(mut self, discards: usize) -> Self {
        self.discard_limit = discards;
        self
    }

    /// Create a new config replaying a recorded shrink path.
    pub fn with_reproduction_path(mut self, path: &str) -> Self {
        self.reproduction_path = Some(path.to_string());
        self
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}
