//! Error types surfaced by the public solve API.

use thiserror::Error;

/// Everything that can go wrong between a facelet string and a maneuver.
///
/// Table construction failures are not represented here; an inconsistent
/// pruning table is a bug in the solver itself and aborts construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The input string is not a well-formed facelet definition.
    #[error("invalid facelet string: {reason}")]
    InvalidFacelet { reason: String },

    /// The facelets decode, but the resulting cube cannot be reached from
    /// the solved state (orientation sum or permutation parity is off).
    #[error("unsolvable cube: {reason}")]
    InvalidCube { reason: String },

    /// A maneuver string contained a token outside the move grammar.
    #[error("invalid move token `{token}`")]
    InvalidManeuver { token: String },

    /// The time budget expired before any solution was found.
    #[error("no solution found within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The bounded search space held no solution of the requested length.
    #[error("no solution of at most {max_length} moves found")]
    LengthExceeded { max_length: usize },
}
