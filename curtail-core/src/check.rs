//! The outer check runner: configuration handling, the thoroughness pass,
//! and counterexample reproduction.
//!
//! [`check`] is the entry point tests call. It resolves the configuration
//! (seeding from entropy when no seed is given), runs the exploration, and
//! on failure re-explores from the same root seed at shifted initial sizes
//! to see whether a different region of the search space yields a simpler
//! counterexample. The winner is reported with a reproduction path that
//! [`reproduce`] can replay without searching.

use crate::data::{Config, Seed, Size};
use crate::error::{EngineError, Result};
use crate::property::{FailureReason, Falsification, Property, PropertyResult};

/// Initial-size offsets for the thoroughness reruns after a falsification.
/// Each rerun starts at a larger size than the one before, saturating at
/// the top of the size dial rather than wrapping below the original.
const THOROUGHNESS_OFFSETS: [usize; 3] = [17, 43, 71];

/// Outcome of a configured check run.
#[derive(Debug, Clone)]
pub enum CheckResult<T> {
    /// Every test passed.
    Passed { tests_run: usize },
    /// A minimized counterexample was found.
    Failed(CounterExample<T>),
    /// The generator could not supply enough values within the discard
    /// budget.
    GaveUp { tests_run: usize, discards: usize },
}

impl<T> CheckResult<T> {
    pub fn is_passed(&self) -> bool {
        matches!(self, CheckResult::Passed { .. })
    }
}

/// A counterexample, minimized and ready to replay.
#[derive(Debug, Clone)]
pub struct CounterExample<T> {
    /// The seed of the generator run that produced the failure.
    pub seed: Seed,
    /// The size of that run.
    pub size: Size,
    /// The recorded shrink descent, `:`-joined child indices.
    pub reproduction_path: String,
    /// The minimized failing value.
    pub value: T,
    /// The value's complexity.
    pub complexity: f64,
    /// How the check failed.
    pub reason: FailureReason,
    /// Tests that passed before the failure was found.
    pub tests_run: usize,
}

impl<T: std::fmt::Debug> std::fmt::Display for CounterExample<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "falsified after {} passed tests", self.tests_run)?;
        writeln!(f, "counterexample: {:?}", self.value)?;
        writeln!(f, "reason: {}", self.reason)?;
        write!(
            f,
            "replay: seed ({}, {}), {}, path \"{}\"",
            self.seed.0, self.seed.1, self.size, self.reproduction_path
        )
    }
}

/// A configured size must fit the 0..=99 dial; anything larger is a
/// configuration mistake, not a request to saturate.
fn validated_size(config: &Config) -> Result<Option<usize>> {
    match config.size {
        Some(size) if size >= 100 => Err(EngineError::InvalidConfig {
            message: format!("size {size} is out of range 0..=99"),
        }),
        other => Ok(other),
    }
}

/// Render a shrink path as the `:`-joined form stored in configs.
pub fn format_path(path: &[usize]) -> String {
    path.iter()
        .map(|index| index.to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// Parse a `:`-joined shrink path. The empty string is the empty path.
pub fn parse_path(path: &str) -> Result<Vec<usize>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split(':')
        .map(|segment| {
            segment.parse::<usize>().map_err(|_| EngineError::InvalidPath {
                path: path.to_string(),
            })
        })
        .collect()
}

/// Run a property under a configuration.
///
/// With a `reproduction_path` set this replays the recorded counterexample
/// instead of searching; otherwise it explores, and on falsification runs
/// the thoroughness pass before reporting.
pub fn check<T: Clone + 'static>(
    property: &Property<T>,
    config: &Config,
) -> Result<CheckResult<T>> {
    if config.reproduction_path.is_some() {
        return reproduce(property, config);
    }

    let root_seed = config.seed.unwrap_or_else(Seed::random);
    let initial_size = Size::new(validated_size(config)?.unwrap_or(0));

    match property.explore(root_seed, initial_size, config)? {
        PropertyResult::Unfalsified { tests_run, .. } => Ok(CheckResult::Passed { tests_run }),
        PropertyResult::Exhausted {
            tests_run,
            discards,
        } => Ok(CheckResult::GaveUp {
            tests_run,
            discards,
        }),
        PropertyResult::Falsified(first) => {
            let best = thoroughness_pass(property, root_seed, initial_size, config, first)?;
            Ok(CheckResult::Failed(counterexample_from(best)))
        }
    }
}

/// Re-explore from the same root seed at successively larger initial
/// sizes, keeping the falsification with the lowest complexity. Ties go to
/// the smaller size, which seeds the cheaper replay.
fn thoroughness_pass<T: Clone + 'static>(
    property: &Property<T>,
    root_seed: Seed,
    initial_size: Size,
    config: &Config,
    first: Falsification<T>,
) -> Result<Falsification<T>> {
    let mut best = first;
    for offset in THOROUGHNESS_OFFSETS {
        let shifted = Size::new((initial_size.get() + offset).min(99));
        if let PropertyResult::Falsified(candidate) =
            property.explore(root_seed, shifted, config)?
        {
            let better = candidate.complexity < best.complexity
                || (candidate.complexity == best.complexity
                    && candidate.size.get() < best.size.get());
            if better {
                best = candidate;
            }
        }
    }
    Ok(best)
}

fn counterexample_from<T>(falsification: Falsification<T>) -> CounterExample<T> {
    CounterExample {
        seed: falsification.seed,
        size: falsification.size,
        reproduction_path: format_path(&falsification.path),
        value: falsification.counterexample,
        complexity: falsification.complexity,
        reason: falsification.reason,
        tests_run: falsification.tests_passed,
    }
}

/// Replay a recorded counterexample from its seed, size, and path.
///
/// The value is re-checked: a replay whose check now passes reports
/// `Passed`, which is how a fixed bug shows up against a stale replay
/// config.
pub fn reproduce<T: Clone + 'static>(
    property: &Property<T>,
    config: &Config,
) -> Result<CheckResult<T>> {
    let path_text = config
        .reproduction_path
        .as_deref()
        .ok_or_else(|| EngineError::InvalidConfig {
            message: "reproduction requires a recorded path".to_string(),
        })?;
    let seed = config.seed.ok_or_else(|| EngineError::InvalidConfig {
        message: "reproduction requires an explicit seed".to_string(),
    })?;
    let size_value = validated_size(config)?.ok_or_else(|| EngineError::InvalidConfig {
        message: "reproduction requires an explicit size".to_string(),
    })?;

    let path = parse_path(path_text)?;
    let size = Size::new(size_value);

    let replayed = property.regenerate(seed, size, &path, config.discard_limit)?;
    match replayed.reason {
        None => Ok(CheckResult::Passed { tests_run: 1 }),
        Some(reason) => Ok(CheckResult::Failed(CounterExample {
            seed,
            size,
            reproduction_path: path_text.to_string(),
            value: replayed.value,
            complexity: replayed.complexity,
            reason,
            tests_run: 0,
        })),
    }
}
