//! Curtail property-based testing library.
//!
//! This is the main entry point for the Curtail library, re-exporting the
//! engine from `curtail-core`: generators with integrated shrinking,
//! properties, and the check runner.

pub use curtail_core::*;
