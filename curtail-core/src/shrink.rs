//! Shrink strategies: pure functions from a value to a lazy sequence of
//! smaller candidates.
//!
//! Strategies never yield the value they were given, and every candidate is
//! simpler than it by the strategy's own measure. They are total and
//! non-throwing; a strategy that panics is a caller programming error.

use crate::lazy::LazySeq;
use std::rc::Rc;

/// A shrink strategy for values of type `T`.
pub struct Shrink<T> {
    strategy: Rc<dyn Fn(&T) -> LazySeq<T>>,
}

impl<T> Clone for Shrink<T> {
    fn clone(&self) -> Self {
        Shrink {
            strategy: self.strategy.clone(),
        }
    }
}

impl<T: Clone + 'static> Shrink<T> {
    pub fn new<F>(strategy: F) -> Self
    where
        F: Fn(&T) -> LazySeq<T> + 'static,
    {
        Shrink {
            strategy: Rc::new(strategy),
        }
    }

    /// The strategy that never shrinks anything.
    pub fn none() -> Self {
        Shrink::new(|_| LazySeq::empty())
    }

    /// The candidates for a value, simplest first.
    pub fn shrink(&self, value: &T) -> LazySeq<T> {
        (self.strategy)(value)
    }

    /// Try this strategy's candidates, then another's.
    pub fn then(&self, other: &Shrink<T>) -> Shrink<T> {
        let first = self.clone();
        let second = other.clone();
        Shrink::new(move |value| first.shrink(value).chain(&second.shrink(value)))
    }
}

/// Shrink an integer toward `target` by repeated halving of the offset.
///
/// Yields `target` itself, then successively closer values, stopping once
/// the remaining offset halves to zero. Empty when the value already equals
/// the target; the original value is never yielded.
pub fn towards(target: i64) -> Shrink<i64> {
    Shrink::new(move |&value| {
        if value == target {
            return LazySeq::empty();
        }
        LazySeq::new(move || {
            let diff = value as i128 - target as i128;
            let halved = std::iter::successors(Some(diff / 2), |&h| {
                let next = h / 2;
                (next != 0).then_some(next)
            })
            .take_while(|&h| h != 0)
            .map(move |h| (value as i128 - h) as i64);
            std::iter::once(target).chain(halved)
        })
    })
}

/// Structural shrinking of a vector: reorder, drop suffixes, then try all
/// smaller combinations.
///
/// Phases, in candidate order:
/// 1. if `order` is supplied and the elements are not already sorted by it,
///    the stably reordered vector;
/// 2. prefixes at each target length from `towards(min_len)` applied to the
///    current length;
/// 3. for each of those target lengths, every combination of that many
///    elements in stable left-to-right order, skipping the prefix already
///    produced by phase 2.
///
/// Every candidate keeps at least `min_len` elements. A vector already at
/// `min_len` has no structural candidates.
pub fn sequence<E>(min_len: usize, order: Option<Rc<dyn Fn(&E) -> f64>>) -> Shrink<Vec<E>>
where
    E: Clone + 'static,
{
    Shrink::new(move |items: &Vec<E>| {
        let items = items.clone();
        let len = items.len();

        let mut candidates = LazySeq::empty();

        if let Some(key) = &order {
            let keys: Vec<f64> = items.iter().map(|e| key(e)).collect();
            let sorted_already = keys.windows(2).all(|w| w[0] <= w[1]);
            if !sorted_already {
                let mut indices: Vec<usize> = (0..len).collect();
                indices.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
                let reordered: Vec<E> = indices.iter().map(|&i| items[i].clone()).collect();
                candidates = candidates.chain(&LazySeq::singleton(reordered));
            }
        }

        if len > min_len {
            let lengths = towards(min_len as i64).shrink(&(len as i64));

            let prefix_source = items.clone();
            let prefixes =
                lengths.map(move |target| prefix_source[..target as usize].to_vec());
            candidates = candidates.chain(&prefixes);

            let combo_source = items;
            let combos = towards(min_len as i64)
                .shrink(&(len as i64))
                .flat_map(move |target| {
                    let k = target as usize;
                    if k == 0 {
                        // The empty vector was already produced as a prefix.
                        LazySeq::empty()
                    } else {
                        // Skip the first combination: it is the prefix.
                        subsequences(combo_source.clone(), k, 1)
                    }
                });
            candidates = candidates.chain(&combos);
        }

        candidates
    })
}

/// All length-`k` sub-selections of a vector, relative order preserved,
/// enumerated in lexicographic index order.
pub fn combinations<E>(k: usize) -> Shrink<Vec<E>>
where
    E: Clone + 'static,
{
    Shrink::new(move |items: &Vec<E>| subsequences(items.clone(), k, 0))
}

/// Shrink one element at a time, in index order, holding the others fixed.
pub fn elements<E>(element: Shrink<E>) -> Shrink<Vec<E>>
where
    E: Clone + 'static,
{
    Shrink::new(move |items: &Vec<E>| {
        let items = items.clone();
        let element = element.clone();
        LazySeq::new(move || {
            let items = items.clone();
            let element = element.clone();
            (0..items.len()).flat_map(move |index| {
                let items = items.clone();
                element.shrink(&items[index]).iter().map(move |candidate| {
                    let mut next = items.clone();
                    next[index] = candidate;
                    next
                })
            })
        })
    })
}

fn subsequences<E>(items: Vec<E>, k: usize, skip: usize) -> LazySeq<Vec<E>>
where
    E: Clone + 'static,
{
    LazySeq::new(move || {
        let items = items.clone();
        IndexCombinations::new(items.len(), k)
            .skip(skip)
            .map(move |indices| indices.iter().map(|&i| items[i].clone()).collect())
    })
}

/// Iterator over the `C(n, k)` index combinations in lexicographic order.
struct IndexCombinations {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl IndexCombinations {
    fn new(n: usize, k: usize) -> Self {
        IndexCombinations {
            n,
            k,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }

        // Advance the rightmost index that still has room to move.
        let mut position = self.k;
        while position > 0 {
            position -= 1;
            if self.indices[position] < self.n - self.k + position {
                self.indices[position] += 1;
                for later in position + 1..self.k {
                    self.indices[later] = self.indices[later - 1] + 1;
                }
                return Some(self.indices.clone());
            }
        }
        self.done = true;
        None
    }
}
