//! Core types for combidoe

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::SpecificationError;
use crate::validate::validate;

/// Number of values each factor can take, in factor order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct FactorSpec {
    depths: Vec<u32>,
}

impl FactorSpec {
    pub fn new(depths: Vec<u32>) -> Result<Self, SpecificationError> {
        if depths.is_empty() {
            return Err(SpecificationError::EmptySpecification);
        }
        if let Some(index) = depths.iter().position(|&d| d == 0) {
            return Err(SpecificationError::ZeroDepth { index });
        }
        Ok(Self { depths })
    }

    pub fn depths(&self) -> &[u32] {
        &self.depths
    }

    /// Number of factors
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Smallest experiment count that could cover every `n_way` subset.
    pub fn min_experiments(&self, n_way: usize) -> u64 {
        largest_product(&self.depths, n_way)
    }
}

impl TryFrom<Vec<u32>> for FactorSpec {
    type Error = SpecificationError;

    fn try_from(depths: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(depths)
    }
}

impl From<FactorSpec> for Vec<u32> {
    fn from(spec: FactorSpec) -> Self {
        spec.depths
    }
}

/// Product of the `n` largest depths, saturating at `u64::MAX`.
pub(crate) fn largest_product(depths: &[u32], n: usize) -> u64 {
    let mut sorted = depths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .into_iter()
        .take(n)
        .fold(1u64, |acc, d| acc.saturating_mul(u64::from(d)))
}

/// One row of a covering array: a value for every factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Experiment(Vec<u32>);

impl Experiment {
    pub fn new(values: Vec<u32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[u32] {
        &self.0
    }

    /// Value of factor `index`
    pub fn get(&self, index: usize) -> u32 {
        self.0[index]
    }
}

impl From<Vec<u32>> for Experiment {
    fn from(values: Vec<u32>) -> Self {
        Self(values)
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// Ordered rows produced by one generation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentSet {
    rows: Vec<Experiment>,
}

impl ExperimentSet {
    pub fn new(rows: Vec<Experiment>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Experiment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Experiment> {
        self.rows.iter()
    }

    /// Copy with repeated rows dropped, keeping first occurrences in order.
    pub fn deduplicated(&self) -> ExperimentSet {
        let mut seen = HashSet::with_capacity(self.rows.len());
        let rows = self
            .rows
            .iter()
            .filter(|row| seen.insert(*row))
            .cloned()
            .collect();
        ExperimentSet { rows }
    }
}

impl From<Vec<Vec<u32>>> for ExperimentSet {
    fn from(rows: Vec<Vec<u32>>) -> Self {
        Self::new(rows.into_iter().map(Experiment::from).collect())
    }
}

impl<'a> IntoIterator for &'a ExperimentSet {
    type Item = &'a Experiment;
    type IntoIter = std::slice::Iter<'a, Experiment>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A validated request: factor depths, coverage strength and row budget.
///
/// Only [`Design::new`] builds one, so holders can rely on the structural
/// invariants without checking them again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Design {
    factors: FactorSpec,
    n_way: usize,
    experiments: usize,
}

impl Design {
    pub fn new(
        depths: Vec<u32>,
        n_way: usize,
        experiments: usize,
    ) -> Result<Self, SpecificationError> {
        validate(&depths, experiments, n_way)?;
        Ok(Self {
            factors: FactorSpec::new(depths)?,
            n_way,
            experiments,
        })
    }

    pub fn factors(&self) -> &FactorSpec {
        &self.factors
    }

    pub fn depths(&self) -> &[u32] {
        self.factors.depths()
    }

    /// Coverage strength
    pub fn n_way(&self) -> usize {
        self.n_way
    }

    /// Rows generated per attempt
    pub fn experiments(&self) -> usize {
        self.experiments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_spec_rejects_empty_and_zero() {
        assert_eq!(
            FactorSpec::new(vec![]),
            Err(SpecificationError::EmptySpecification)
        );
        assert_eq!(
            FactorSpec::new(vec![2, 0, 3]),
            Err(SpecificationError::ZeroDepth { index: 1 })
        );
    }

    #[test]
    fn test_min_experiments_uses_largest_depths() {
        let spec = FactorSpec::new(vec![2, 4, 3, 1]).unwrap();
        assert_eq!(spec.min_experiments(2), 12);
        assert_eq!(spec.min_experiments(3), 24);
        assert_eq!(spec.min_experiments(4), 24);
    }

    #[test]
    fn test_min_experiments_saturates() {
        let spec = FactorSpec::new(vec![u32::MAX; 4]).unwrap();
        assert_eq!(spec.min_experiments(4), u64::MAX);
    }

    #[test]
    fn test_experiment_display_matches_list_notation() {
        assert_eq!(Experiment::new(vec![0, 1, 2]).to_string(), "[0, 1, 2]");
        assert_eq!(Experiment::new(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_deduplicated_keeps_first_occurrence_order() {
        let set = ExperimentSet::from(vec![
            vec![1, 0],
            vec![0, 0],
            vec![1, 0],
            vec![0, 1],
            vec![0, 0],
        ]);
        let unique = set.deduplicated();
        assert_eq!(
            unique,
            ExperimentSet::from(vec![vec![1, 0], vec![0, 0], vec![0, 1]])
        );
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_factor_spec_serde_validates() {
        let spec: FactorSpec = serde_json::from_str("[2, 3]").unwrap();
        assert_eq!(spec.depths(), &[2, 3]);
        assert!(serde_json::from_str::<FactorSpec>("[2, 0]").is_err());
    }

    #[test]
    fn test_design_new_validates() {
        let design = Design::new(vec![2, 3], 2, 6).unwrap();
        assert_eq!(design.n_way(), 2);
        assert_eq!(design.experiments(), 6);
        assert!(Design::new(vec![2, 3], 2, 5).is_err());
    }
}
