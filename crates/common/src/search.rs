//! Brute-force covering-array search
//!
//! The driver draws a fresh random experiment set per attempt and checks it
//! for coverage until one passes. [`Search`] exposes the loop as an iterator
//! of [`AttemptOutcome`]s so callers decide how to report progress, when to
//! stop, and how to cancel.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coverage::{first_uncovered, CoverageGap};
use crate::generate::{attempt_seed, generate, time_seed};
use crate::types::{Design, ExperimentSet};

/// How the run seed governs attempts after the first one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// Every attempt seed is derived from the run seed and the attempt
    /// index, so one seed reproduces the whole run.
    #[default]
    PerRun,
    /// The run seed drives attempt 1 only; later attempts reseed from the
    /// clock.
    FirstAttempt,
}

impl SeedPolicy {
    /// Seed used by `attempt` (1-based).
    pub fn seed_for(self, run_seed: u64, attempt: u64) -> u64 {
        match self {
            SeedPolicy::PerRun => attempt_seed(run_seed, attempt),
            SeedPolicy::FirstAttempt if attempt <= 1 => run_seed,
            SeedPolicy::FirstAttempt => time_seed(),
        }
    }
}

/// Search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Run seed; drawn from the clock when unset
    pub seed: Option<u64>,
    pub policy: SeedPolicy,
    /// Stop after this many attempts. `None` searches until solved.
    pub max_attempts: Option<u64>,
}

/// A covering experiment set and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// 1-based attempt that produced the set
    pub attempt: u64,
    /// Seed of the whole run
    pub run_seed: u64,
    /// Seed of the producing attempt; `generate` with it rebuilds the set
    pub seed: u64,
    pub experiments: ExperimentSet,
}

impl Solution {
    /// Rows with duplicates removed, first occurrences kept in order.
    pub fn unique_rows(&self) -> ExperimentSet {
        self.experiments.deduplicated()
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Uncovered {
        attempt: u64,
        seed: u64,
        gap: CoverageGap,
    },
    Solved(Solution),
}

impl AttemptOutcome {
    pub fn attempt(&self) -> u64 {
        match self {
            AttemptOutcome::Uncovered { attempt, .. } => *attempt,
            AttemptOutcome::Solved(solution) => solution.attempt,
        }
    }
}

/// Generate and check a single attempt.
pub fn evaluate_attempt(design: &Design, run_seed: u64, attempt: u64, seed: u64) -> AttemptOutcome {
    let (experiments, seed) = generate(design.depths(), design.experiments(), Some(seed));
    match first_uncovered(design.n_way(), design.depths(), &experiments) {
        Some(gap) => AttemptOutcome::Uncovered { attempt, seed, gap },
        None => AttemptOutcome::Solved(Solution {
            attempt,
            run_seed,
            seed,
            experiments,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Searching,
    Solved,
}

/// Iterator over search attempts; fused once an attempt is solved.
#[derive(Debug, Clone)]
pub struct Search {
    design: Design,
    policy: SeedPolicy,
    max_attempts: Option<u64>,
    run_seed: u64,
    attempt: u64,
    state: SearchState,
}

impl Search {
    pub fn new(design: Design, config: &SearchConfig) -> Self {
        let run_seed = config.seed.unwrap_or_else(time_seed);
        debug!(
            run_seed,
            policy = ?config.policy,
            n_way = design.n_way(),
            rows = design.experiments(),
            "starting search"
        );
        Self {
            design,
            policy: config.policy,
            max_attempts: config.max_attempts,
            run_seed,
            attempt: 1,
            state: SearchState::Searching,
        }
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    /// Attempts evaluated so far
    pub fn attempts(&self) -> u64 {
        self.attempt - 1
    }

    pub fn is_solved(&self) -> bool {
        self.state == SearchState::Solved
    }
}

impl Iterator for Search {
    type Item = AttemptOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == SearchState::Solved {
            return None;
        }
        if self.max_attempts.is_some_and(|max| self.attempt > max) {
            return None;
        }

        let seed = self.policy.seed_for(self.run_seed, self.attempt);
        let outcome = evaluate_attempt(&self.design, self.run_seed, self.attempt, seed);
        match &outcome {
            AttemptOutcome::Solved(solution) => {
                info!(attempt = solution.attempt, seed = solution.seed, "solution found");
                self.state = SearchState::Solved;
            }
            AttemptOutcome::Uncovered { attempt, gap, .. } => {
                debug!(attempt, %gap, "solution not found");
            }
        }
        self.attempt += 1;

        Some(outcome)
    }
}

/// Run the search to completion.
///
/// Returns `None` only when `max_attempts` runs out.
pub fn search(design: Design, config: &SearchConfig) -> Option<Solution> {
    Search::new(design, config).find_map(|outcome| match outcome {
        AttemptOutcome::Solved(solution) => Some(solution),
        AttemptOutcome::Uncovered { .. } => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::is_n_way_covered;

    fn design() -> Design {
        Design::new(vec![2, 2, 2], 2, 4).unwrap()
    }

    fn config(seed: u64) -> SearchConfig {
        SearchConfig {
            seed: Some(seed),
            max_attempts: Some(100_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_solution_covers() {
        let solution = search(design(), &config(4)).expect("solvable");
        assert!(is_n_way_covered(2, &[2, 2, 2], &solution.experiments));
        assert!(is_n_way_covered(2, &[2, 2, 2], &solution.unique_rows()));
        assert_eq!(solution.run_seed, 4);
        assert_eq!(solution.experiments.len(), 4);
    }

    #[test]
    fn test_seed_4_solves_on_fifth_attempt() {
        let solution = search(design(), &config(4)).unwrap();
        assert_eq!(solution.attempt, 5);
        assert_eq!(solution.seed, attempt_seed(4, 5));
        assert_eq!(
            solution.unique_rows(),
            ExperimentSet::from(vec![
                vec![1, 1, 0],
                vec![0, 1, 1],
                vec![0, 0, 0],
                vec![1, 0, 1],
            ])
        );
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let a = search(design(), &config(4)).unwrap();
        let b = search(design(), &config(4)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempt_seed_rebuilds_solution() {
        let solution = search(design(), &config(17)).unwrap();
        let (rebuilt, _) = generate(&[2, 2, 2], 4, Some(solution.seed));
        assert_eq!(rebuilt, solution.experiments);
        assert_eq!(solution.seed, attempt_seed(17, solution.attempt));
    }

    #[test]
    fn test_iterator_counts_and_fuses() {
        let mut search = Search::new(design(), &config(4));
        let mut last = 0;
        for outcome in search.by_ref() {
            assert_eq!(outcome.attempt(), last + 1);
            last = outcome.attempt();
        }
        assert!(search.is_solved());
        assert_eq!(search.attempts(), last);
        assert!(search.next().is_none());
    }

    #[test]
    fn test_max_attempts_bounds_search() {
        // Depth 3 pairs cannot be covered by 9 random rows often; 3 attempts
        // is almost never enough, but either way no more than 3 are made.
        let design = Design::new(vec![3, 3, 3, 3], 2, 9).unwrap();
        let cfg = SearchConfig {
            seed: Some(1),
            max_attempts: Some(3),
            ..Default::default()
        };
        let mut search = Search::new(design, &cfg);
        let outcomes: Vec<_> = search.by_ref().collect();
        assert!(outcomes.len() <= 3);
        assert!(search.next().is_none());
    }

    #[test]
    fn test_zero_budget_makes_no_attempts() {
        let cfg = SearchConfig {
            seed: Some(1),
            max_attempts: Some(0),
            ..Default::default()
        };
        assert!(search(design(), &cfg).is_none());
    }

    #[test]
    fn test_first_attempt_policy() {
        assert_eq!(SeedPolicy::FirstAttempt.seed_for(9, 1), 9);
        assert_eq!(SeedPolicy::PerRun.seed_for(9, 1), 9);
        assert_eq!(SeedPolicy::PerRun.seed_for(9, 5), attempt_seed(9, 5));

        let cfg = SearchConfig {
            seed: Some(9),
            policy: SeedPolicy::FirstAttempt,
            max_attempts: Some(100_000),
        };
        let solution = search(design(), &cfg).unwrap();
        assert_eq!(solution.run_seed, 9);
        let (rebuilt, _) = generate(&[2, 2, 2], 4, Some(solution.seed));
        assert_eq!(rebuilt, solution.experiments);
    }

    #[test]
    fn test_full_factorial_first_try() {
        // Only the middle factor varies, so a covering set has two distinct rows
        let design = Design::new(vec![1, 2, 1], 3, 64).unwrap();
        let solution = search(design, &config(3)).unwrap();
        assert_eq!(solution.unique_rows().len(), 2);
    }

    #[test]
    fn test_seed_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&SeedPolicy::FirstAttempt).unwrap(),
            "\"first-attempt\""
        );
        let policy: SeedPolicy = serde_json::from_str("\"per-run\"").unwrap();
        assert_eq!(policy, SeedPolicy::PerRun);
    }
}
