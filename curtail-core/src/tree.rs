//! Lazy rose trees carrying a generated value together with all of its
//! possible reductions.
//!
//! A tree is a pure value: the forest is a shared, re-runnable [`LazySeq`],
//! so trees clone cheaply and only the levels actually visited are ever
//! computed. Every subtree holds a value the originating shrink strategy
//! considers simpler than its parent; algorithms may rely on that but never
//! enforce it.

use crate::lazy::LazySeq;
use crate::shrink::Shrink;
use std::rc::Rc;

pub mod render;

/// The complexity metric attached to generated values: distance from the
/// simplest value in range, used only to order shrink attempts.
pub type ComplexityFn<T> = Rc<dyn Fn(&T) -> f64>;

/// A rose tree of a value, its complexity, and its lazy shrink forest.
pub struct Tree<T> {
    pub value: T,
    pub complexity: f64,
    pub shrinks: LazySeq<Tree<T>>,
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Tree {
            value: self.value.clone(),
            complexity: self.complexity,
            shrinks: self.shrinks.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("value", &self.value)
            .field("complexity", &self.complexity)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Tree<T> {
    /// A leaf with no shrinks and zero complexity.
    pub fn singleton(value: T) -> Self {
        Tree {
            value,
            complexity: 0.0,
            shrinks: LazySeq::empty(),
        }
    }

    /// A leaf with an explicit complexity.
    pub fn with_complexity(value: T, complexity: f64) -> Self {
        Tree {
            value,
            complexity,
            shrinks: LazySeq::empty(),
        }
    }

    /// Build a tree lazily from a seed value and a shrink strategy.
    ///
    /// The forest applies `unfold` to each of the strategy's candidates on
    /// demand; no level beyond the root is computed until pulled.
    pub fn unfold(value: T, shrink: &Shrink<T>, complexity: &ComplexityFn<T>) -> Tree<T> {
        let cost = complexity(&value);
        let shrinks = {
            let shrink = shrink.clone();
            let complexity = complexity.clone();
            shrink
                .shrink(&value)
                .map(move |candidate| Tree::unfold(candidate, &shrink, &complexity))
        };
        Tree {
            value,
            complexity: cost,
            shrinks,
        }
    }

    /// Transform every value in the tree, preserving laziness and
    /// complexity.
    pub fn map<U, F>(&self, f: F) -> Tree<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + Clone + 'static,
    {
        let value = f(self.value.clone());
        let shrinks = self.shrinks.map(move |subtree| subtree.map(f.clone()));
        Tree {
            value,
            complexity: self.complexity,
            shrinks,
        }
    }

    /// Filter a forest by a predicate on values.
    ///
    /// A subtree whose value satisfies the predicate is kept, with its own
    /// forest recursively filtered. A rejected subtree is replaced by its
    /// children, so a rejected shrink does not hide smaller candidates that
    /// would have passed.
    pub fn filter_forest(
        forest: &LazySeq<Tree<T>>,
        predicate: Rc<dyn Fn(&T) -> bool>,
    ) -> LazySeq<Tree<T>> {
        forest.flat_map(move |subtree| {
            let filtered = Tree::filter_forest(&subtree.shrinks, predicate.clone());
            if predicate(&subtree.value) {
                LazySeq::singleton(Tree {
                    value: subtree.value,
                    complexity: subtree.complexity,
                    shrinks: filtered,
                })
            } else {
                filtered
            }
        })
    }

    /// Combine independently generated trees into one tree of vectors.
    ///
    /// The root holds each child's root value; its complexity is the sum of
    /// the children's plus `extra_complexity` (the cost of the length
    /// itself). The forest applies `shrinker` to the child-tree list, which
    /// is what lets a vector shrink both by dropping elements and by
    /// shrinking elements in place.
    pub fn concat(
        trees: Vec<Tree<T>>,
        extra_complexity: f64,
        shrinker: &Shrink<Vec<Tree<T>>>,
    ) -> Tree<Vec<T>> {
        let value: Vec<T> = trees.iter().map(|t| t.value.clone()).collect();
        let complexity =
            extra_complexity + trees.iter().map(|t| t.complexity).sum::<f64>();
        let shrinks = {
            let shrinker = shrinker.clone();
            shrinker
                .shrink(&trees)
                .map(move |shrunk| Tree::concat(shrunk, extra_complexity, &shrinker))
        };
        Tree {
            value,
            complexity,
            shrinks,
        }
    }

    /// Generic recursive reducer. The folded forest is itself lazy, so the
    /// visitor decides how much of the tree to force.
    pub fn fold<A: 'static>(&self, visit: &Rc<dyn Fn(&T, f64, LazySeq<A>) -> A>) -> A {
        let folded = {
            let visit = visit.clone();
            self.shrinks.map(move |subtree| subtree.fold(&visit))
        };
        visit(&self.value, self.complexity, folded)
    }

    /// Drop all shrink information, irreversibly.
    pub fn prune(&self) -> Tree<T> {
        Tree {
            value: self.value.clone(),
            complexity: self.complexity,
            shrinks: LazySeq::empty(),
        }
    }

    /// Zero the complexity metric of every node.
    pub fn zero_complexity(&self) -> Tree<T> {
        Tree {
            value: self.value.clone(),
            complexity: 0.0,
            shrinks: self.shrinks.map(|subtree| subtree.zero_complexity()),
        }
    }

    /// Add a constant to the complexity of every node.
    pub fn add_complexity(&self, delta: f64) -> Tree<T> {
        Tree {
            value: self.value.clone(),
            complexity: self.complexity + delta,
            shrinks: self
                .shrinks
                .map(move |subtree| subtree.add_complexity(delta)),
        }
    }

    /// Walk the shrink forest by child index. `None` if the path falls off
    /// the tree.
    pub fn find(&self, path: &[usize]) -> Option<Tree<T>> {
        match path.split_first() {
            None => Some(self.clone()),
            Some((&index, rest)) => self
                .shrinks
                .iter()
                .nth(index)
                .and_then(|subtree| subtree.find(rest)),
        }
    }

    /// Collect values down to a given depth; a diagnostic aid, since the
    /// forest may be far too large to force fully.
    pub fn expand(&self, max_depth: usize) -> Vec<T> {
        let mut result = vec![self.value.clone()];
        self.expand_recursive(&mut result, max_depth, 0);
        result
    }

    fn expand_recursive(&self, result: &mut Vec<T>, max_depth: usize, current_depth: usize) {
        if current_depth >= max_depth {
            return;
        }
        for child in self.shrinks.iter() {
            result.push(child.value.clone());
            child.expand_recursive(result, max_depth, current_depth + 1);
        }
    }

    /// Check if the tree has any shrinks at all.
    pub fn has_shrinks(&self) -> bool {
        !self.shrinks.is_empty()
    }
}
