//! Core functionality for Curtail property-based testing.
//!
//! This crate provides the fundamental building blocks for property-based
//! testing with Curtail: splittable seeds, lazy shrink trees, generators,
//! and the exploration loop that finds and minimizes counterexamples.

pub mod check;
pub mod data;
pub mod error;
pub mod gen;
pub mod lazy;
pub mod property;
pub mod range;
pub mod shrink;
pub mod tree;

// Re-export the main types
pub use check::*;
pub use data::*;
pub use error::*;
pub use gen::*;
pub use lazy::*;
pub use property::*;
pub use range::*;
pub use tree::*;
