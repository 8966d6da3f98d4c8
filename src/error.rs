//! Learner error types

use thiserror::Error;

/// Errors surfaced while building a learner or its corpus.
///
/// All of these are construction errors: once a learner exists, the
/// remaining degenerate cases (empty clusters, transition-free states) are
/// handled by explicit fallback policy rather than reported as errors.
#[derive(Error, Debug)]
pub enum LearnError {
    #[error("corpus contains no sequences")]
    NoSequences,

    #[error("sequence {0} is empty")]
    EmptySequence(usize),

    #[error("state count must be at least 1, got {0}")]
    InvalidStateCount(usize),

    #[error("requested {requested} clusters but corpus has only {available} observations")]
    TooFewObservations { requested: usize, available: usize },
}

/// Result type for learner construction
pub type LearnResult<T> = Result<T, LearnError>;
