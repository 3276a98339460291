//! Error types for the curtail engine.
//!
//! Three failure kinds are kept apart on purpose: generator configuration
//! errors (fatal, surfaced here), discards (recoverable, handled inside
//! generators), and property falsifications (not errors at all — they are
//! reported as structured results).

use thiserror::Error;

/// A generator configuration error. Fatal: it aborts the run and is never
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// The shrink origin falls outside the sampling bounds.
    #[error("origin {origin} lies outside the range [{min}, {max}]")]
    OriginOutsideRange { min: i64, max: i64, origin: i64 },
}

/// Errors surfaced by the check runner.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A generator was misconfigured.
    #[error(transparent)]
    Gen(#[from] GenError),

    /// A reproduction path did not parse or fell off the shrink forest.
    #[error("invalid reproduction path '{path}'")]
    InvalidPath { path: String },

    /// The run configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Replay could not regenerate the recorded counterexample.
    #[error("reproduction failed: {message}")]
    Reproduction { message: String },
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, EngineError>;
