//! Error types for combidoe

use thiserror::Error;

/// Result type alias using the combidoe Error
pub type Result<T> = std::result::Result<T, Error>;

/// combidoe error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid specification: {0}")]
    InvalidSpecification(#[from] SpecificationError),
}

/// Structural invariant violated by a requested design.
///
/// Each variant carries the offending values so callers can build a
/// diagnostic without re-deriving them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecificationError {
    #[error("specification must list at least one factor depth")]
    EmptySpecification,

    #[error("factor {index} has depth 0; every factor needs at least one value")]
    ZeroDepth { index: usize },

    #[error("number of experiments must be greater than 0")]
    NoExperiments,

    #[error("\"factors\" should be > 1 (got {n_way})")]
    StrengthTooLow { n_way: usize },

    #[error("{n_way}-way coverage needs at least {n_way} factors, specification has {factors}")]
    TooFewFactors { factors: usize, n_way: usize },

    #[error(
        "experiments count can not be less than product of {n_way} largest numbers \
         in specification ({minimum}), got {experiments}"
    )]
    InsufficientExperiments {
        experiments: usize,
        minimum: u64,
        n_way: usize,
    },
}
