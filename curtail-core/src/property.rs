//! Properties and the exploration loop that falsifies them.
//!
//! A property pairs a generator with a check. Exploration runs the check
//! over a growing search: each passing test advances the size one step, so
//! early tests probe trivial values and later tests probe complex ones.
//! The first failing value is then minimized by a greedy descent through
//! its shrink tree, recording the child index taken at each level so the
//! descent can be replayed without searching.

use crate::data::{Config, Seed, Size};
use crate::error::{EngineError, Result};
use crate::gen::{Gen, GenIteration};
use crate::tree::Tree;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Why a check rejected a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The check returned `false`.
    ReturnedFalse,
    /// The check panicked; the payload message is preserved.
    Panicked(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::ReturnedFalse => write!(f, "check returned false"),
            FailureReason::Panicked(message) => write!(f, "check panicked: {message}"),
        }
    }
}

/// A minimized counterexample and everything needed to replay it.
#[derive(Debug, Clone)]
pub struct Falsification<T> {
    /// The smallest failing value the descent reached.
    pub counterexample: T,
    /// The counterexample's complexity.
    pub complexity: f64,
    /// Child indices taken at each level of the shrink tree.
    pub path: Vec<usize>,
    /// How the check failed on the counterexample.
    pub reason: FailureReason,
    /// The seed the failing generator run started from.
    pub seed: Seed,
    /// The size the failing generator run used.
    pub size: Size,
    /// Shrink candidates evaluated during the descent.
    pub shrinks_examined: usize,
    /// Tests that passed before this failure was found.
    pub tests_passed: usize,
}

/// Outcome of one exploration run.
#[derive(Debug, Clone)]
pub enum PropertyResult<T> {
    /// Every test passed.
    Unfalsified { tests_run: usize, discards: usize },
    /// A failing value was found and minimized.
    Falsified(Falsification<T>),
    /// The generator could not supply enough values, either structurally
    /// or because the discard budget ran out.
    Exhausted { tests_run: usize, discards: usize },
}

/// A generator together with the check its values must satisfy.
pub struct Property<T> {
    gen: Gen<T>,
    check: Rc<dyn Fn(&T) -> bool>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Property {
            gen: self.gen.clone(),
            check: self.check.clone(),
        }
    }
}

/// Universal quantification: the check must hold for every generated value.
pub fn for_all<T, F>(gen: Gen<T>, check: F) -> Property<T>
where
    T: Clone + 'static,
    F: Fn(&T) -> bool + 'static,
{
    Property {
        gen,
        check: Rc::new(check),
    }
}

impl<T: Clone + 'static> Property<T> {
    pub fn for_all<F>(gen: Gen<T>, check: F) -> Property<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        for_all(gen, check)
    }

    /// Run the check on one value, capturing panics as failures.
    fn failure_of(&self, value: &T) -> Option<FailureReason> {
        let check = self.check.clone();
        match panic::catch_unwind(AssertUnwindSafe(|| check(value))) {
            Ok(true) => None,
            Ok(false) => Some(FailureReason::ReturnedFalse),
            Err(payload) => Some(FailureReason::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Run the growing search from a root seed and initial size.
    ///
    /// Each iteration splits off its own seed, draws the first instance at
    /// the current size, and checks it. Passing tests advance the size one
    /// wrapping step; a failing test is minimized before returning.
    /// Discards count against the configured budget across the whole run.
    pub fn explore(
        &self,
        root_seed: Seed,
        initial_size: Size,
        config: &Config,
    ) -> Result<PropertyResult<T>> {
        let mut seed = root_seed;
        let mut size = initial_size;
        let mut tests_run = 0usize;
        let mut discards = 0usize;

        for _ in 0..config.iterations {
            let (iteration_seed, rest) = seed.split();
            seed = rest;

            match self.first_instance(iteration_seed, size, config.discard_limit, &mut discards)? {
                Drawn::Instance(tree) => match self.failure_of(&tree.value) {
                    None => {
                        tests_run += 1;
                        size = size.next_cycle();
                    }
                    Some(reason) => {
                        let minimized =
                            self.minimize(tree, reason, config.shrink_limit);
                        return Ok(PropertyResult::Falsified(Falsification {
                            counterexample: minimized.tree.value,
                            complexity: minimized.tree.complexity,
                            path: minimized.path,
                            reason: minimized.reason,
                            seed: iteration_seed,
                            size,
                            shrinks_examined: minimized.examined,
                            tests_passed: tests_run,
                        }));
                    }
                },
                Drawn::Exhausted => {
                    return Ok(PropertyResult::Exhausted {
                        tests_run,
                        discards,
                    })
                }
            }
        }

        Ok(PropertyResult::Unfalsified {
            tests_run,
            discards,
        })
    }

    /// Pull the first instance from a generator run, charging discards
    /// against the shared budget.
    fn first_instance(
        &self,
        seed: Seed,
        size: Size,
        discard_limit: usize,
        discards: &mut usize,
    ) -> Result<Drawn<T>> {
        for iteration in self.gen.run(seed, size) {
            match iteration {
                GenIteration::Instance { tree, .. } => return Ok(Drawn::Instance(tree)),
                GenIteration::Discard { .. } => {
                    *discards += 1;
                    if *discards > discard_limit {
                        return Ok(Drawn::Exhausted);
                    }
                }
                GenIteration::Exhausted => return Ok(Drawn::Exhausted),
                GenIteration::Error(error) => return Err(EngineError::Gen(error)),
            }
        }
        Ok(Drawn::Exhausted)
    }

    /// Greedy depth-first descent: at each level take the leftmost child
    /// that still fails, until no child fails or the candidate budget is
    /// spent.
    fn minimize(&self, tree: Tree<T>, reason: FailureReason, shrink_limit: usize) -> Minimized<T> {
        let mut current = tree;
        let mut current_reason = reason;
        let mut path = Vec::new();
        let mut examined = 0usize;

        'descend: loop {
            for (index, child) in current.shrinks.iter().enumerate() {
                if examined >= shrink_limit {
                    break 'descend;
                }
                examined += 1;
                if let Some(child_reason) = self.failure_of(&child.value) {
                    path.push(index);
                    current = child;
                    current_reason = child_reason;
                    continue 'descend;
                }
            }
            break;
        }

        Minimized {
            tree: current,
            reason: current_reason,
            path,
            examined,
        }
    }

    /// Replay a recorded counterexample: draw the instance at the recorded
    /// seed and size, then walk the shrink tree by the recorded indices.
    pub fn regenerate(
        &self,
        seed: Seed,
        size: Size,
        path: &[usize],
        discard_limit: usize,
    ) -> Result<Regenerated<T>> {
        let mut discards = 0usize;
        match self.first_instance(seed, size, discard_limit, &mut discards)? {
            Drawn::Exhausted => Err(EngineError::Reproduction {
                message: format!("no instance at {seed} with {size}"),
            }),
            Drawn::Instance(tree) => {
                let found = tree.find(path).ok_or_else(|| EngineError::InvalidPath {
                    path: path
                        .iter()
                        .map(|index| index.to_string())
                        .collect::<Vec<_>>()
                        .join(":"),
                })?;
                let reason = self.failure_of(&found.value);
                Ok(Regenerated {
                    value: found.value,
                    complexity: found.complexity,
                    reason,
                })
            }
        }
    }
}

/// A replayed counterexample, re-checked.
#[derive(Debug, Clone)]
pub struct Regenerated<T> {
    pub value: T,
    pub complexity: f64,
    /// `None` if the check now passes on the replayed value.
    pub reason: Option<FailureReason>,
}

enum Drawn<T> {
    Instance(Tree<T>),
    Exhausted,
}

struct Minimized<T> {
    tree: Tree<T>,
    reason: FailureReason,
    path: Vec<usize>,
    examined: usize,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{Range, ScaleMode};

    fn run<T: Clone + 'static>(property: &Property<T>, seed: u64) -> PropertyResult<T> {
        property
            .explore(Seed::from_u64(seed), Size::new(0), &Config::default())
            .unwrap()
    }

    #[test]
    fn test_true_property_is_unfalsified() {
        let property = for_all(Gen::integer(0, 100), |&n| n >= 0);
        match run(&property, 1) {
            PropertyResult::Unfalsified { tests_run, .. } => assert_eq!(tests_run, 100),
            other => panic!("expected unfalsified, got {other:?}"),
        }
    }

    #[test]
    fn test_false_property_minimizes_to_smallest_failure() {
        let property = for_all(Gen::integer(0, 100), |&n| n < 10);
        match run(&property, 2) {
            PropertyResult::Falsified(falsification) => {
                // The smallest integer violating `n < 10` is exactly 10.
                assert_eq!(falsification.counterexample, 10);
                assert_eq!(falsification.reason, FailureReason::ReturnedFalse);
            }
            other => panic!("expected falsified, got {other:?}"),
        }
    }

    #[test]
    fn test_panicking_check_is_a_failure() {
        let property = for_all(Gen::integer(0, 100), |&n| {
            if n > 10 {
                panic!("too big: {n}");
            }
            true
        });
        match run(&property, 3) {
            PropertyResult::Falsified(falsification) => {
                assert_eq!(falsification.counterexample, 11);
                match falsification.reason {
                    FailureReason::Panicked(message) => assert!(message.contains("too big")),
                    other => panic!("expected panic reason, got {other:?}"),
                }
            }
            other => panic!("expected falsified, got {other:?}"),
        }
    }

    #[test]
    fn test_exploration_is_deterministic() {
        let make = || for_all(Gen::integer(0, 1000), |&n| n < 500);
        let first = run(&make(), 9);
        let second = run(&make(), 9);
        match (first, second) {
            (PropertyResult::Falsified(a), PropertyResult::Falsified(b)) => {
                assert_eq!(a.counterexample, b.counterexample);
                assert_eq!(a.path, b.path);
                assert_eq!(a.seed, b.seed);
                assert_eq!(a.size, b.size);
            }
            other => panic!("expected two falsifications, got {other:?}"),
        }
    }

    #[test]
    fn test_structurally_empty_generator_exhausts() {
        let property = for_all(Gen::<i64>::element(Vec::new()), |_| true);
        match run(&property, 4) {
            PropertyResult::Exhausted { tests_run, .. } => assert_eq!(tests_run, 0),
            other => panic!("expected exhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_discard_budget_exhausts() {
        let property = for_all(Gen::integer(0, 100).filter(|_| false), |_| true);
        let result = property
            .explore(
                Seed::from_u64(5),
                Size::new(50),
                &Config::default().with_discard_limit(20),
            )
            .unwrap();
        match result {
            PropertyResult::Exhausted { discards, .. } => assert_eq!(discards, 21),
            other => panic!("expected exhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_generator_error_surfaces() {
        let property = for_all(Gen::integer_with_origin(0, 10, 50), |_| true);
        let result = property.explore(Seed::from_u64(6), Size::new(0), &Config::default());
        assert!(matches!(result, Err(EngineError::Gen(_))));
    }

    #[test]
    fn test_regenerate_replays_recorded_path() {
        let property = for_all(Gen::integer(0, 1000), |&n| n < 500);
        let falsification = match run(&property, 7) {
            PropertyResult::Falsified(falsification) => falsification,
            other => panic!("expected falsified, got {other:?}"),
        };

        let replayed = property
            .regenerate(
                falsification.seed,
                falsification.size,
                &falsification.path,
                100,
            )
            .unwrap();
        assert_eq!(replayed.value, falsification.counterexample);
        assert_eq!(replayed.reason, Some(falsification.reason));
    }

    #[test]
    fn test_regenerate_rejects_bad_path() {
        let property = for_all(Gen::integer(0, 1000), |&n| n < 500);
        let falsification = match run(&property, 7) {
            PropertyResult::Falsified(falsification) => falsification,
            other => panic!("expected falsified, got {other:?}"),
        };

        let mut path = falsification.path.clone();
        path.push(usize::MAX);
        let result = property.regenerate(falsification.seed, falsification.size, &path, 100);
        assert!(matches!(result, Err(EngineError::InvalidPath { .. })));
    }

    #[test]
    fn test_growing_search_starts_small() {
        // With a linear range and initial size 0 the very first draw is the
        // origin, so a property failing at the origin falsifies on test one
        // with nothing to shrink.
        let gen = Gen::integer_in(Range::from_unordered(0, 100, 0, ScaleMode::Linear));
        let property = for_all(gen, |&n| n != 0);
        match run(&property, 8) {
            PropertyResult::Falsified(falsification) => {
                assert_eq!(falsification.counterexample, 0);
                assert!(falsification.path.is_empty());
            }
            other => panic!("expected falsified, got {other:?}"),
        }
    }
}
