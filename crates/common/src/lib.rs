//! combidoe Common Library
//!
//! Brute-force construction of combinatorial covering arrays: random
//! experiment sets are drawn until one covers every value combination of
//! every `n`-factor subset.
//!
//! ```text
//! validate ──> Design ──> Search ──┬─> generate (seeded ChaCha8 stream)
//!                                  └─> is_n_way_covered / first_uncovered
//! ```

pub mod coverage;
pub mod error;
pub mod generate;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod search;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use coverage::{
    coverage_report, first_uncovered, is_n_way_covered, Combinations, CoverageGap, CoverageReport,
};
pub use error::{Error, Result, SpecificationError};
pub use generate::{attempt_seed, generate, generate_with_rng, time_seed};
#[cfg(feature = "parallel")]
pub use parallel::search_parallel;
pub use search::{
    evaluate_attempt, search, AttemptOutcome, Search, SearchConfig, SeedPolicy, Solution,
};
pub use types::*;
pub use validate::validate;

/// combidoe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
