//! Generators and their combinators.
//!
//! A generator is a function `(Seed, Size) -> stream of iterations`. Running
//! it twice with the same arguments produces observably identical
//! iterations. Instances and discards carry the post-draw seed, so a
//! dependent generator can continue the random stream at the exact position
//! the previous draw finished; that linear threading is what makes
//! `flat_map` replay deterministic and exactly associative.
//!
//! Streams produce instances and discards indefinitely; consumption is
//! bounded by the caller. A stream ends only after a terminal `Exhausted`
//! or `Error` iteration.

use crate::data::{Seed, Size};
use crate::error::GenError;
use crate::range::{Range, ScaleMode};
use crate::shrink::{self, Shrink};
use crate::tree::{ComplexityFn, Tree};
use std::rc::Rc;

/// How many stream positions a `flat_map` replay scans forward when the
/// shrunk left-hand side consumes a different amount of randomness than the
/// original draw did.
const REPLAY_SCAN_LIMIT: usize = 16;

/// How many consecutive discards a filtered generator tolerates before it
/// widens the size it draws at.
const DISCARDS_BEFORE_RESIZE: usize = 10;

/// One step of a generator's output.
#[derive(Debug, Clone)]
pub enum GenIteration<T> {
    /// A value was produced, together with its shrink tree and the seed the
    /// stream continues from.
    Instance { tree: Tree<T>, next_seed: Seed },
    /// A filter rejected a value; the draw is retried, not terminal.
    Discard { rejected: String, next_seed: Seed },
    /// The generator structurally cannot produce a value. Terminal.
    Exhausted,
    /// A configuration error. Terminal, never retried.
    Error(GenError),
}

impl<T> GenIteration<T> {
    pub fn into_tree(self) -> Option<Tree<T>> {
        match self {
            GenIteration::Instance { tree, .. } => Some(tree),
            _ => None,
        }
    }
}

type GenStream<T> = Box<dyn Iterator<Item = GenIteration<T>>>;

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values composed with combinator
/// methods rather than derived from types.
pub struct Gen<T> {
    runner: Rc<dyn Fn(Seed, Size) -> GenStream<T>>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            runner: self.runner.clone(),
        }
    }
}

impl<T: Clone + 'static> Gen<T> {
    /// Create a generator from a raw stream function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Seed, Size) -> GenStream<T> + 'static,
    {
        Gen { runner: Rc::new(f) }
    }

    /// Run the generator, producing a fresh iteration stream.
    pub fn run(&self, seed: Seed, size: Size) -> GenStream<T> {
        (self.runner)(seed, size)
    }

    /// The primitive constructor: a draw function, a shrink strategy, and a
    /// complexity function.
    ///
    /// Each step draws a value, threads the seed forward, and unfolds the
    /// value's shrink tree lazily. The stream keeps producing instances
    /// until the consumer stops pulling.
    pub fn create<D, C>(draw: D, shrink: Shrink<T>, complexity: C) -> Self
    where
        D: Fn(Seed, Size) -> (T, Seed) + 'static,
        C: Fn(&T) -> f64 + 'static,
    {
        let draw = Rc::new(draw);
        let complexity: ComplexityFn<T> = Rc::new(complexity);
        Gen::new(move |seed, size| {
            let draw = draw.clone();
            let shrink = shrink.clone();
            let complexity = complexity.clone();
            let mut state = seed;
            Box::new(std::iter::from_fn(move || {
                let (value, next) = draw(state, size);
                state = next;
                Some(GenIteration::Instance {
                    tree: Tree::unfold(value, &shrink, &complexity),
                    next_seed: state,
                })
            }))
        })
    }

    /// A generator that always produces the same value, consuming no
    /// randomness.
    pub fn constant(value: T) -> Self {
        Gen::new(move |seed, _size| {
            let value = value.clone();
            Box::new(std::iter::repeat_with(move || GenIteration::Instance {
                tree: Tree::singleton(value.clone()),
                next_seed: seed,
            }))
        })
    }

    /// A generator that reports a configuration error.
    pub fn from_error(error: GenError) -> Self {
        Gen::new(move |_seed, _size| {
            let error = error.clone();
            Box::new(std::iter::once(GenIteration::Error(error)))
        })
    }

    /// Pick a uniform element of a collection.
    ///
    /// Picks carry no complexity (the collection is unordered) and shrink
    /// toward the first element. An empty collection is structurally
    /// exhausted.
    pub fn element(choices: Vec<T>) -> Self {
        if choices.is_empty() {
            return Gen::new(|_seed, _size| Box::new(std::iter::once(GenIteration::Exhausted)));
        }
        let last = (choices.len() - 1) as i64;
        Gen::<i64>::create(
            move |seed, _size| seed.next_in_range(0, last),
            shrink::towards(0),
            |_| 0.0,
        )
        .map(move |index| choices[index as usize].clone())
    }

    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        let f = Rc::new(f);
        Gen::new(move |seed, size| {
            let f = f.clone();
            Box::new(self.run(seed, size).map(move |iteration| match iteration {
                GenIteration::Instance { tree, next_seed } => {
                    let f = f.clone();
                    GenIteration::Instance {
                        tree: tree.map(move |value| f(value)),
                        next_seed,
                    }
                }
                GenIteration::Discard { rejected, next_seed } => {
                    GenIteration::Discard { rejected, next_seed }
                }
                GenIteration::Exhausted => GenIteration::Exhausted,
                GenIteration::Error(error) => GenIteration::Error(error),
            }))
        })
    }

    /// Keep only values satisfying a predicate.
    ///
    /// Rejected draws are reported as discards and retried; after
    /// [`DISCARDS_BEFORE_RESIZE`] consecutive rejections the generator
    /// restarts its source one size larger, on the premise that more varied
    /// draws are more likely to satisfy the predicate. Discards never stop
    /// being reported; bounding them is the consumer's job.
    ///
    /// Accepted trees keep only the shrinks that also satisfy the
    /// predicate, with rejected shrinks replaced by their children.
    pub fn filter<P>(self, predicate: P) -> Gen<T>
    where
        T: std::fmt::Debug,
        P: Fn(&T) -> bool + 'static,
    {
        let predicate: Rc<dyn Fn(&T) -> bool> = Rc::new(predicate);
        Gen::new(move |seed, size| {
            let source = self.clone();
            let predicate = predicate.clone();
            let mut inner = source.run(seed, size);
            let mut size = size;
            let mut consecutive = 0usize;
            Box::new(std::iter::from_fn(move || match inner.next() {
                Some(GenIteration::Instance { tree, next_seed }) => {
                    if predicate(&tree.value) {
                        consecutive = 0;
                        let shrinks = Tree::filter_forest(&tree.shrinks, predicate.clone());
                        Some(GenIteration::Instance {
                            tree: Tree {
                                value: tree.value,
                                complexity: tree.complexity,
                                shrinks,
                            },
                            next_seed,
                        })
                    } else {
                        consecutive += 1;
                        let rejected = format!("{:?}", tree.value);
                        if consecutive >= DISCARDS_BEFORE_RESIZE {
                            consecutive = 0;
                            size = Size::new(size.get() + 1);
                            inner = source.run(next_seed, size);
                        }
                        Some(GenIteration::Discard { rejected, next_seed })
                    }
                }
                other => other,
            }))
        })
    }

    /// Dependent generation: draw a value, then draw from the generator it
    /// selects.
    ///
    /// The merged instance's complexity is the sum of both sides'. Its
    /// shrinks are the left-hand shrinks, each replayed through `k` against
    /// the same fragment of the random stream the original right-hand draw
    /// consumed, followed by the right-hand shrinks with the left
    /// complexity added. Discards and terminal iterations from either side
    /// are interleaved into the output before the merged instance.
    pub fn flat_map<U, K>(self, k: K) -> Gen<U>
    where
        U: Clone + 'static,
        K: Fn(T) -> Gen<U> + 'static,
    {
        let k: Rc<dyn Fn(T) -> Gen<U>> = Rc::new(k);
        Gen::new(move |seed, size| {
            Box::new(FlatMapIter {
                source: self.clone(),
                k: k.clone(),
                size,
                state: FlatMapState::Left(self.run(seed, size)),
            })
        })
    }

    /// Pair two independent generators.
    pub fn zip<U>(self, other: Gen<U>) -> Gen<(T, U)>
    where
        U: Clone + 'static,
    {
        self.flat_map(move |left| {
            let other = other.clone();
            other.map(move |right| (left.clone(), right))
        })
    }

    /// Generate vectors whose length is drawn from `lengths`.
    ///
    /// The length comes from a split-off sub-stream; the elements thread
    /// the seed sequentially. Element trees are combined with
    /// [`Tree::concat`], shrinking both structurally (dropping elements,
    /// complexity-sorted first) and element-wise. A drawn length of zero
    /// short-circuits to an unshrinkable empty vector.
    pub fn vec_of(self, lengths: Range) -> Gen<Vec<T>> {
        let min_len = lengths.min.max(0) as usize;
        Gen::new(move |seed, size| {
            Box::new(CollectIter {
                source: self.clone(),
                lengths,
                shrinker: vec_tree_shrinker(min_len),
                size,
                seed,
                collecting: None,
                done: false,
            })
        })
    }

    /// Generate vectors with lengths in `[min_len, max_len]`, growing from
    /// `min_len` with size.
    pub fn vec(self, min_len: usize, max_len: usize) -> Gen<Vec<T>> {
        self.vec_of(Range::from_unordered(
            min_len as i64,
            max_len as i64,
            min_len as i64,
            ScaleMode::Linear,
        ))
    }

    /// Drop all shrink information from every instance.
    pub fn no_shrink(self) -> Gen<T> {
        self.map_trees(|tree| tree.prune())
    }

    /// Zero the complexity metric of every instance.
    pub fn no_complexity(self) -> Gen<T> {
        self.map_trees(|tree| tree.zero_complexity())
    }

    fn map_trees<F>(self, f: F) -> Gen<T>
    where
        F: Fn(Tree<T>) -> Tree<T> + 'static,
    {
        let f = Rc::new(f);
        Gen::new(move |seed, size| {
            let f = f.clone();
            Box::new(self.run(seed, size).map(move |iteration| match iteration {
                GenIteration::Instance { tree, next_seed } => GenIteration::Instance {
                    tree: f(tree),
                    next_seed,
                },
                other => other,
            }))
        })
    }

    /// The first instance tree of a run, skipping up to `scan` non-instance
    /// iterations.
    pub fn first_tree(&self, seed: Seed, size: Size, scan: usize) -> Option<Tree<T>> {
        self.run(seed, size)
            .take(scan)
            .find_map(GenIteration::into_tree)
    }

    /// The first `count` instance values of a run. Sampling helper for
    /// tests and diagnostics.
    pub fn samples(&self, seed: Seed, size: Size, count: usize) -> Vec<T> {
        self.run(seed, size)
            .filter_map(|iteration| iteration.into_tree().map(|tree| tree.value))
            .take(count)
            .collect()
    }
}

impl Gen<i64> {
    /// Generate an integer in `[min, max]`, shrinking toward zero (clamped
    /// into the range) and growing linearly with size.
    pub fn integer(min: i64, max: i64) -> Gen<i64> {
        let origin = 0i64.clamp(min.min(max), min.max(max));
        Gen::integer_in(Range::from_unordered(min, max, origin, ScaleMode::Linear))
    }

    /// Generate an integer from an explicit range.
    pub fn integer_in(range: Range) -> Gen<i64> {
        Gen::create(
            move |seed, size| {
                let (low, high) = range.sized_bounds(size);
                seed.next_in_range(low, high)
            },
            shrink::towards(range.origin),
            move |&value| range.proportional_distance(value),
        )
    }

    /// Generate an integer shrinking toward `origin`. An origin outside the
    /// bounds is a configuration error, surfaced in-band.
    pub fn integer_with_origin(min: i64, max: i64, origin: i64) -> Gen<i64> {
        match Range::with_origin(min, max, origin, ScaleMode::Linear) {
            Ok(range) => Gen::integer_in(range),
            Err(error) => Gen::from_error(error),
        }
    }
}

impl Gen<bool> {
    /// Generate a random boolean, shrinking toward `false`.
    pub fn bool() -> Gen<bool> {
        Gen::integer_in(Range::from_unordered(0, 1, 0, ScaleMode::Constant)).map(|n| n == 1)
    }
}

/// The forest shrinker used by `vec_of`: structural shrinking over the
/// child-tree list (ordered by ascending complexity), then element-wise
/// shrinking through each tree's own forest.
fn vec_tree_shrinker<T: Clone + 'static>(min_len: usize) -> Shrink<Vec<Tree<T>>> {
    let order: Rc<dyn Fn(&Tree<T>) -> f64> = Rc::new(|tree| tree.complexity);
    let structural = shrink::sequence(min_len, Some(order));
    let in_place = shrink::elements(Shrink::new(|tree: &Tree<T>| tree.shrinks.clone()));
    structural.then(&in_place)
}

enum FlatMapState<T, U> {
    Left(GenStream<T>),
    Right {
        left: Tree<T>,
        right_seed: Seed,
        right: GenStream<U>,
    },
    Done,
}

struct FlatMapIter<T, U> {
    source: Gen<T>,
    k: Rc<dyn Fn(T) -> Gen<U>>,
    size: Size,
    state: FlatMapState<T, U>,
}

impl<T: Clone + 'static, U: Clone + 'static> Iterator for FlatMapIter<T, U> {
    type Item = GenIteration<U>;

    fn next(&mut self) -> Option<GenIteration<U>> {
        loop {
            match std::mem::replace(&mut self.state, FlatMapState::Done) {
                FlatMapState::Done => return None,
                FlatMapState::Left(mut left) => match left.next() {
                    Some(GenIteration::Instance { tree, next_seed }) => {
                        let right = (self.k)(tree.value.clone()).run(next_seed, self.size);
                        self.state = FlatMapState::Right {
                            left: tree,
                            right_seed: next_seed,
                            right,
                        };
                    }
                    Some(GenIteration::Discard { rejected, next_seed }) => {
                        self.state = FlatMapState::Left(left);
                        return Some(GenIteration::Discard { rejected, next_seed });
                    }
                    Some(GenIteration::Exhausted) | None => return Some(GenIteration::Exhausted),
                    Some(GenIteration::Error(error)) => return Some(GenIteration::Error(error)),
                },
                FlatMapState::Right {
                    left,
                    right_seed,
                    mut right,
                } => match right.next() {
                    Some(GenIteration::Instance { tree, next_seed }) => {
                        let merged = merge_trees(&left, tree, &self.k, right_seed, self.size);
                        self.state = FlatMapState::Left(self.source.run(next_seed, self.size));
                        return Some(GenIteration::Instance {
                            tree: merged,
                            next_seed,
                        });
                    }
                    Some(GenIteration::Discard { rejected, next_seed }) => {
                        self.state = FlatMapState::Right {
                            left,
                            right_seed,
                            right,
                        };
                        return Some(GenIteration::Discard { rejected, next_seed });
                    }
                    Some(GenIteration::Exhausted) | None => return Some(GenIteration::Exhausted),
                    Some(GenIteration::Error(error)) => return Some(GenIteration::Error(error)),
                },
            }
        }
    }
}

/// Merge a left-hand tree with the right-hand tree its value selected.
///
/// Left shrinks re-run `k` against the same right-hand seed, so replaying a
/// left shrink at the same stream position is deterministic; candidates for
/// which no right-hand instance turns up within the scan budget are
/// skipped. Right shrinks keep the left value fixed and carry its
/// complexity.
fn merge_trees<T, U>(
    left: &Tree<T>,
    right: Tree<U>,
    k: &Rc<dyn Fn(T) -> Gen<U>>,
    right_seed: Seed,
    size: Size,
) -> Tree<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let complexity = left.complexity + right.complexity;
    let left_shrinks = {
        let k = k.clone();
        left.shrinks.filter_map(move |shrunk| {
            replay_right(&k, shrunk.value.clone(), right_seed, size)
                .map(|replayed| merge_trees(&shrunk, replayed, &k, right_seed, size))
        })
    };
    let right_shrinks = {
        let base = left.complexity;
        right.shrinks.map(move |subtree| subtree.add_complexity(base))
    };
    Tree {
        value: right.value,
        complexity,
        shrinks: left_shrinks.chain(&right_shrinks),
    }
}

fn replay_right<T, U>(
    k: &Rc<dyn Fn(T) -> Gen<U>>,
    value: T,
    seed: Seed,
    size: Size,
) -> Option<Tree<U>>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    k(value)
        .run(seed, size)
        .take(REPLAY_SCAN_LIMIT)
        .find_map(GenIteration::into_tree)
}

enum CollectPhase<T> {
    Gathering {
        remaining: usize,
        extra_complexity: f64,
        trees: Vec<Tree<T>>,
        inner: GenStream<T>,
        last_seed: Seed,
    },
}

struct CollectIter<T> {
    source: Gen<T>,
    lengths: Range,
    shrinker: Shrink<Vec<Tree<T>>>,
    size: Size,
    seed: Seed,
    collecting: Option<CollectPhase<T>>,
    done: bool,
}

impl<T: Clone + 'static> Iterator for CollectIter<T> {
    type Item = GenIteration<Vec<T>>;

    fn next(&mut self) -> Option<GenIteration<Vec<T>>> {
        loop {
            if self.done {
                return None;
            }

            if let Some(CollectPhase::Gathering {
                remaining,
                extra_complexity,
                trees,
                inner,
                last_seed,
            }) = &mut self.collecting
            {
                if *remaining == 0 {
                    let next_seed = *last_seed;
                    let extra = *extra_complexity;
                    let trees = std::mem::take(trees);
                    self.collecting = None;
                    self.seed = next_seed;
                    return Some(GenIteration::Instance {
                        tree: Tree::concat(trees, extra, &self.shrinker),
                        next_seed,
                    });
                }
                match inner.next() {
                    Some(GenIteration::Instance { tree, next_seed }) => {
                        trees.push(tree);
                        *last_seed = next_seed;
                        *remaining -= 1;
                    }
                    Some(GenIteration::Discard { rejected, next_seed }) => {
                        return Some(GenIteration::Discard { rejected, next_seed });
                    }
                    Some(GenIteration::Exhausted) | None => {
                        self.done = true;
                        return Some(GenIteration::Exhausted);
                    }
                    Some(GenIteration::Error(error)) => {
                        self.done = true;
                        return Some(GenIteration::Error(error));
                    }
                }
                continue;
            }

            // Start a new round: length from its own sub-stream, elements
            // threaded from the remainder.
            let (length_seed, rest) = self.seed.split();
            let (low, high) = self.lengths.sized_bounds(self.size);
            let (length, _) = length_seed.next_in_range(low.max(0), high.max(0));
            let extra_complexity = self.lengths.proportional_distance(length);
            self.seed = rest;

            if length == 0 {
                return Some(GenIteration::Instance {
                    tree: Tree::with_complexity(Vec::new(), extra_complexity),
                    next_seed: rest,
                });
            }

            self.collecting = Some(CollectPhase::Gathering {
                remaining: length as usize,
                extra_complexity,
                trees: Vec::new(),
                inner: self.source.run(rest, self.size),
                last_seed: rest,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(n: u64) -> Seed {
        Seed::from_u64(n)
    }

    #[test]
    fn test_generator_is_rerunnable() {
        let gen = Gen::integer(0, 100);
        let first = gen.samples(seed(42), Size::new(60), 20);
        let second = gen.samples(seed(42), Size::new(60), 20);
        assert_eq!(first, second);
        assert!(first.iter().all(|n| (0..=100).contains(n)));
    }

    #[test]
    fn test_integer_respects_sized_bounds() {
        let gen = Gen::integer(0, 100);
        // At size 0 a linear range collapses to its origin.
        assert_eq!(gen.samples(seed(1), Size::new(0), 10), vec![0; 10]);
        for value in gen.samples(seed(1), Size::new(50), 50) {
            assert!((0..=50).contains(&value));
        }
    }

    #[test]
    fn test_integer_tree_shrinks_toward_origin() {
        let gen = Gen::integer(0, 100);
        let tree = gen.first_tree(seed(7), Size::new(100), 10).unwrap();
        if tree.value > 0 {
            let first_level: Vec<i64> = tree.shrinks.iter().map(|t| t.value).collect();
            assert_eq!(first_level[0], 0);
            assert!(first_level.iter().all(|&n| n < tree.value));
        }
    }

    #[test]
    fn test_constant_consumes_no_randomness() {
        let gen = Gen::constant(9i64);
        assert_eq!(gen.samples(seed(1), Size::new(50), 3), vec![9, 9, 9]);
        match gen.run(seed(1), Size::new(50)).next().unwrap() {
            GenIteration::Instance { next_seed, .. } => assert_eq!(next_seed, seed(1)),
            other => panic!("expected instance, got {other:?}"),
        }
    }

    #[test]
    fn test_map_transforms_tree() {
        let gen = Gen::integer(0, 10).map(|n| n * 2);
        let tree = gen.first_tree(seed(3), Size::new(100), 10).unwrap();
        assert_eq!(tree.value % 2, 0);
        assert!(tree.shrinks.iter().all(|t| t.value % 2 == 0));
    }

    #[test]
    fn test_element_draws_from_collection() {
        let choices = vec!["a", "b", "c"];
        let gen = Gen::element(choices.clone());
        for value in gen.samples(seed(11), Size::new(50), 30) {
            assert!(choices.contains(&value));
        }
        // Picks carry no complexity.
        let tree = gen.first_tree(seed(11), Size::new(50), 10).unwrap();
        assert_eq!(tree.complexity, 0.0);
    }

    #[test]
    fn test_element_of_empty_collection_is_exhausted() {
        let gen = Gen::<i64>::element(Vec::new());
        let iterations: Vec<_> = gen.run(seed(1), Size::new(50)).collect();
        assert_eq!(iterations.len(), 1);
        assert!(matches!(iterations[0], GenIteration::Exhausted));
    }

    #[test]
    fn test_invalid_origin_is_an_error_iteration() {
        let gen = Gen::integer_with_origin(0, 10, 50);
        let iterations: Vec<_> = gen.run(seed(1), Size::new(50)).collect();
        assert_eq!(iterations.len(), 1);
        assert!(matches!(iterations[0], GenIteration::Error(_)));
    }

    #[test]
    fn test_filter_with_true_predicate_is_identity() {
        let gen = Gen::integer(0, 100);
        let filtered = Gen::integer(0, 100).filter(|_| true);
        assert_eq!(
            gen.samples(seed(5), Size::new(70), 25),
            filtered.samples(seed(5), Size::new(70), 25)
        );
    }

    #[test]
    fn test_filter_with_false_predicate_discards_forever() {
        let gen = Gen::integer(0, 100).filter(|_| false);
        let iterations: Vec<_> = gen.run(seed(5), Size::new(10)).take(50).collect();
        assert_eq!(iterations.len(), 50);
        assert!(iterations
            .iter()
            .all(|it| matches!(it, GenIteration::Discard { .. })));
    }

    #[test]
    fn test_filter_widens_size_after_consecutive_discards() {
        // At size 0 the range collapses to 0, so the predicate can only be
        // satisfied once the filter has widened the size it draws at.
        let gen = Gen::integer(0, 100).filter(|&n| n > 0);
        let value = gen
            .run(seed(8), Size::new(0))
            .take(500)
            .find_map(GenIteration::into_tree)
            .map(|tree| tree.value);
        assert!(matches!(value, Some(n) if n > 0));
    }

    #[test]
    fn test_filter_keeps_only_satisfying_shrinks() {
        let gen = Gen::integer(0, 100).filter(|&n| n % 2 == 0);
        let tree = gen.first_tree(seed(2), Size::new(100), 200).unwrap();
        assert_eq!(tree.value % 2, 0);
        let level: Vec<i64> = tree.shrinks.iter().take(10).map(|t| t.value).collect();
        assert!(level.iter().all(|&n| n % 2 == 0));
    }

    #[test]
    fn test_flat_map_sums_complexity() {
        let gen = Gen::integer(0, 100).flat_map(|n| Gen::integer(0, 100).map(move |m| (n, m)));
        let tree = gen.first_tree(seed(13), Size::new(100), 10).unwrap();
        let (n, m) = tree.value;
        let range = Range::from_unordered(0, 100, 0, ScaleMode::Linear);
        let expected = range.proportional_distance(n) + range.proportional_distance(m);
        assert!((tree.complexity - expected).abs() < 1e-9);
    }

    #[test]
    fn test_flat_map_is_associative() {
        let left = Gen::integer(0, 50)
            .flat_map(|n| Gen::integer(0, n + 1))
            .flat_map(|m| Gen::integer(0, m + 2));
        let right = Gen::integer(0, 50)
            .flat_map(|n| Gen::integer(0, n + 1).flat_map(|m| Gen::integer(0, m + 2)));
        assert_eq!(
            left.samples(seed(21), Size::new(80), 20),
            right.samples(seed(21), Size::new(80), 20)
        );
    }

    #[test]
    fn test_flat_map_left_shrinks_replay_deterministically() {
        let gen = Gen::integer(1, 50).flat_map(|n| Gen::integer(0, n).map(move |m| (n, m)));
        let tree = gen.first_tree(seed(17), Size::new(100), 10).unwrap();
        let once: Vec<(i64, i64)> = tree.shrinks.iter().take(5).map(|t| t.value).collect();
        let twice: Vec<(i64, i64)> = tree.shrinks.iter().take(5).map(|t| t.value).collect();
        assert_eq!(once, twice);
        for (n, m) in once {
            assert!(m <= n);
        }
    }

    #[test]
    fn test_vec_lengths_respect_range() {
        let gen = Gen::integer(0, 10).vec(2, 5);
        let trees = gen
            .run(seed(9), Size::new(100))
            .filter_map(GenIteration::into_tree)
            .take(20);
        for tree in trees {
            assert!((2..=5).contains(&tree.value.len()));
        }
    }

    #[test]
    fn test_vec_zero_length_is_unshrinkable() {
        let gen = Gen::integer(0, 10).vec(0, 5);
        // At size 0 the length range collapses to its origin, 0.
        let tree = gen.first_tree(seed(4), Size::new(0), 10).unwrap();
        assert!(tree.value.is_empty());
        assert!(!tree.has_shrinks());
    }

    #[test]
    fn test_vec_shrinks_drop_and_shrink_elements() {
        let gen = Gen::integer(0, 10).vec(0, 4);
        let tree = gen
            .run(seed(6), Size::new(100))
            .filter_map(GenIteration::into_tree)
            .find(|tree| tree.value.len() >= 2)
            .unwrap();
        let level: Vec<Vec<i64>> = tree.shrinks.iter().take(30).map(|t| t.value).collect();
        assert!(level.iter().any(|v| v.len() < tree.value.len()));
        assert!(level.iter().all(|v| v.len() <= tree.value.len()));
    }

    #[test]
    fn test_zip_pairs_values() {
        let gen = Gen::integer(0, 5).zip(Gen::integer(10, 20));
        for (a, b) in gen.samples(seed(30), Size::new(100), 20) {
            assert!((0..=5).contains(&a));
            assert!((10..=20).contains(&b));
        }
    }

    #[test]
    fn test_no_shrink_empties_forest() {
        let gen = Gen::integer(0, 100).no_shrink();
        let tree = gen.first_tree(seed(12), Size::new(100), 10).unwrap();
        assert!(!tree.has_shrinks());
    }

    #[test]
    fn test_no_complexity_zeroes_metric() {
        let gen = Gen::integer(0, 100).no_complexity();
        let tree = gen.first_tree(seed(12), Size::new(100), 10).unwrap();
        assert_eq!(tree.complexity, 0.0);
        assert!(tree.shrinks.iter().take(5).all(|t| t.complexity == 0.0));
    }

    #[test]
    fn test_bool_generates_both_values() {
        let samples = Gen::bool().samples(seed(14), Size::new(50), 64);
        assert!(samples.iter().any(|&b| b));
        assert!(samples.iter().any(|&b| !b));
    }
}
