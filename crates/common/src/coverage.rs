//! N-way coverage checking
//!
//! An experiment set covers strength `n` when, for every subset of `n`
//! factor indices, the rows projected onto that subset take every one of
//! the `product(depths[i])` possible value tuples. All subsets are walked
//! through one general [`Combinations`] iterator, whatever `n` is.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::types::ExperimentSet;

/// Lexicographic `k`-subsets of `0..n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

/// A factor subset whose value combinations are not all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageGap {
    /// Factor indices of the subset, ascending
    pub factors: Vec<usize>,
    /// Distinct value tuples seen in the rows
    pub observed: usize,
    /// Distinct value tuples possible over the subset
    pub required: u64,
}

impl fmt::Display for CoverageGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "factors {:?}: {} of {} combinations",
            self.factors, self.observed, self.required
        )
    }
}

/// Coverage over every subset of one strength.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub n_way: usize,
    pub subsets_total: usize,
    pub subsets_covered: usize,
    pub gaps: Vec<CoverageGap>,
}

impl CoverageReport {
    pub fn is_covered(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Whether every `n_way` subset of factors is fully covered by `experiments`.
///
/// Rows must have one value per depth.
pub fn is_n_way_covered(n_way: usize, depths: &[u32], experiments: &ExperimentSet) -> bool {
    first_uncovered(n_way, depths, experiments).is_none()
}

/// First subset, in lexicographic order, that misses a combination.
pub fn first_uncovered(
    n_way: usize,
    depths: &[u32],
    experiments: &ExperimentSet,
) -> Option<CoverageGap> {
    Combinations::new(depths.len(), n_way)
        .map(|subset| check_subset(subset, depths, experiments))
        .find(|gap| (gap.observed as u64) < gap.required)
}

/// Check every subset without stopping at the first gap.
pub fn coverage_report(n_way: usize, depths: &[u32], experiments: &ExperimentSet) -> CoverageReport {
    let mut subsets_total = 0;
    let mut gaps = Vec::new();

    for subset in Combinations::new(depths.len(), n_way) {
        subsets_total += 1;
        let gap = check_subset(subset, depths, experiments);
        if (gap.observed as u64) < gap.required {
            gaps.push(gap);
        }
    }

    CoverageReport {
        n_way,
        subsets_total,
        subsets_covered: subsets_total - gaps.len(),
        gaps,
    }
}

fn check_subset(subset: Vec<usize>, depths: &[u32], experiments: &ExperimentSet) -> CoverageGap {
    let required = subset
        .iter()
        .fold(1u64, |acc, &i| acc.saturating_mul(u64::from(depths[i])));

    let mut seen: HashSet<Vec<u32>> = HashSet::new();
    for row in experiments {
        seen.insert(subset.iter().map(|&i| row.get(i)).collect());
        if seen.len() as u64 == required {
            break;
        }
    }

    CoverageGap {
        factors: subset,
        observed: seen.len(),
        required,
    }
}
