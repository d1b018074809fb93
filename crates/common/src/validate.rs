//! Structural checks on a requested design
//!
//! A design is feasible only when the coverage strength is non-trivial, the
//! specification has enough factors for it, and the row budget is at least
//! the size of the largest `n_way` value space (pigeonhole bound).

use crate::error::SpecificationError;
use crate::types::largest_product;

/// Confirm the number of experiments is theoretically sufficient and the
/// specification is long enough for the requested strength.
pub fn validate(
    depths: &[u32],
    num_experiments: usize,
    n_way: usize,
) -> Result<(), SpecificationError> {
    if n_way <= 1 {
        return Err(SpecificationError::StrengthTooLow { n_way });
    }
    if depths.is_empty() {
        return Err(SpecificationError::EmptySpecification);
    }
    if let Some(index) = depths.iter().position(|&d| d == 0) {
        return Err(SpecificationError::ZeroDepth { index });
    }
    // n_way == depths.len() is plain full-factorial coverage
    if depths.len() < n_way {
        return Err(SpecificationError::TooFewFactors {
            factors: depths.len(),
            n_way,
        });
    }
    if num_experiments == 0 {
        return Err(SpecificationError::NoExperiments);
    }

    let minimum = largest_product(depths, n_way);
    if (num_experiments as u64) < minimum {
        return Err(SpecificationError::InsufficientExperiments {
            experiments: num_experiments,
            minimum,
            n_way,
        });
    }

    Ok(())
}
