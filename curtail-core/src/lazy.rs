//! Pull-based lazy sequences backing generator output and shrink forests.
//!
//! A `LazySeq` is a re-runnable description of a sequence: every call to
//! [`LazySeq::iter`] replays it from the start. Nothing is computed until an
//! iterator is pulled, which is what keeps very large (or conceptually
//! infinite) shrink spaces tractable — only the branches actually visited
//! are ever produced.

use std::rc::Rc;

/// A lazy, re-runnable sequence of values.
pub struct LazySeq<T> {
    produce: Rc<dyn Fn() -> Box<dyn Iterator<Item = T>>>,
}

impl<T> Clone for LazySeq<T> {
    fn clone(&self) -> Self {
        LazySeq {
            produce: self.produce.clone(),
        }
    }
}

impl<T> std::fmt::Debug for LazySeq<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LazySeq(..)")
    }
}

impl<T: 'static> LazySeq<T> {
    /// Create a sequence from an iterator factory.
    ///
    /// The factory is invoked once per replay, so it must be able to
    /// recreate the sequence from scratch.
    pub fn new<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: Iterator<Item = T> + 'static,
    {
        LazySeq {
            produce: Rc::new(move || Box::new(factory())),
        }
    }

    /// The empty sequence.
    pub fn empty() -> Self {
        LazySeq::new(std::iter::empty)
    }

    /// A sequence of exactly one value.
    pub fn singleton(value: T) -> Self
    where
        T: Clone,
    {
        LazySeq::new(move || std::iter::once(value.clone()))
    }

    /// An eager vector viewed as a lazy sequence.
    pub fn from_vec(items: Vec<T>) -> Self
    where
        T: Clone,
    {
        LazySeq::new(move || items.clone().into_iter())
    }

    /// Begin a fresh traversal of the sequence.
    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.produce)()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn map<U, F>(&self, f: F) -> LazySeq<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        LazySeq {
            produce: Rc::new(move || {
                let f = f.clone();
                Box::new(source.iter().map(move |x| f(x)))
            }),
        }
    }

    pub fn filter<F>(&self, predicate: F) -> LazySeq<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        LazySeq {
            produce: Rc::new(move || {
                let predicate = predicate.clone();
                Box::new(source.iter().filter(move |x| predicate(x)))
            }),
        }
    }

    pub fn filter_map<U, F>(&self, f: F) -> LazySeq<U>
    where
        U: 'static,
        F: Fn(T) -> Option<U> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        LazySeq {
            produce: Rc::new(move || {
                let f = f.clone();
                Box::new(source.iter().filter_map(move |x| f(x)))
            }),
        }
    }

    pub fn flat_map<U, F>(&self, f: F) -> LazySeq<U>
    where
        U: 'static,
        F: Fn(T) -> LazySeq<U> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        LazySeq {
            produce: Rc::new(move || {
                let f = f.clone();
                Box::new(source.iter().flat_map(move |x| f(x).iter()))
            }),
        }
    }

    /// Concatenate two sequences.
    pub fn chain(&self, other: &LazySeq<T>) -> LazySeq<T> {
        let first = self.clone();
        let second = other.clone();
        LazySeq::new(move || first.iter().chain(second.iter()))
    }

    pub fn take(&self, count: usize) -> LazySeq<T> {
        let source = self.clone();
        LazySeq::new(move || source.iter().take(count))
    }

    /// Force the whole sequence into a vector. Only safe on finite
    /// sequences; intended for tests and diagnostics.
    pub fn collect_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_nothing_computed_until_pulled() {
        let pulls = Rc::new(Cell::new(0usize));
        let counter = pulls.clone();
        let seq = LazySeq::new(move || {
            let counter = counter.clone();
            (0..10).map(move |n| {
                counter.set(counter.get() + 1);
                n
            })
        });

        assert_eq!(pulls.get(), 0);
        let first: Vec<i32> = seq.iter().take(3).collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(pulls.get(), 3);
    }

    #[test]
    fn test_replay_from_start() {
        let seq = LazySeq::from_vec(vec![1, 2, 3]);
        assert_eq!(seq.collect_vec(), vec![1, 2, 3]);
        // A second traversal sees the same values, not a drained cursor.
        assert_eq!(seq.collect_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_map_filter_chain() {
        let seq = LazySeq::from_vec(vec![1, 2, 3, 4])
            .map(|n| n * 10)
            .filter(|n| *n > 10);
        assert_eq!(seq.collect_vec(), vec![20, 30, 40]);

        let chained = LazySeq::singleton(0).chain(&seq);
        assert_eq!(chained.collect_vec(), vec![0, 20, 30, 40]);
    }

    #[test]
    fn test_flat_map_is_lazy() {
        let expansions = Rc::new(Cell::new(0usize));
        let counter = expansions.clone();
        let seq = LazySeq::from_vec(vec![1, 2, 3]).flat_map(move |n| {
            counter.set(counter.get() + 1);
            LazySeq::from_vec(vec![n, n])
        });

        assert_eq!(expansions.get(), 0);
        let head: Vec<i32> = seq.iter().take(2).collect();
        assert_eq!(head, vec![1, 1]);
        assert_eq!(expansions.get(), 1);
    }

    #[test]
    fn test_empty_and_is_empty() {
        assert!(LazySeq::<i32>::empty().is_empty());
        assert!(!LazySeq::singleton(1).is_empty());
    }
}
