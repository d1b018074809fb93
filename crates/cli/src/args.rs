//! Command-line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use combidoe_common::SeedPolicy;

use crate::output::OutputFormat;

/// Creates a covering array for a given specification using brute force:
/// random experiments are generated until they achieve full coverage for
/// the requested number of factors.
/// See https://math.nist.gov/coveringarrays/coveringarray.html for an
/// explanation of covering arrays.
#[derive(Parser, Debug, Clone)]
#[command(name = "combidoe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of random experiments to generate per attempt. A higher value
    /// increases the chance to find a solution.
    #[arg(long)]
    pub experiments: usize,

    /// Covering strength of the resulting array. Equal to the length of
    /// --specification means full coverage.
    #[arg(long)]
    pub factors: usize,

    /// Number of possible values of each variable, e.g. "2 2 2" is three
    /// variables with two values each. A comma-separated list also works.
    #[arg(long, num_args = 1.., value_delimiter = ',', required = true)]
    pub specification: Vec<u32>,

    /// Random seed for the run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Whether the seed drives every attempt or only the first one
    #[arg(long, value_enum)]
    pub seed_policy: Option<SeedPolicyArg>,

    /// Give up after this many attempts
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Worker threads trying attempts in parallel
    #[arg(long)]
    pub workers: Option<usize>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (TOML)
    #[arg(long, env = "COMBIDOE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedPolicyArg {
    /// Seed makes the whole run reproducible
    PerRun,
    /// Seed only drives the first attempt
    FirstAttempt,
}

impl From<SeedPolicyArg> for SeedPolicy {
    fn from(arg: SeedPolicyArg) -> Self {
        match arg {
            SeedPolicyArg::PerRun => SeedPolicy::PerRun,
            SeedPolicyArg::FirstAttempt => SeedPolicy::FirstAttempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_separated_specification() {
        let cli = Cli::try_parse_from([
            "combidoe",
            "--specification",
            "2",
            "2",
            "2",
            "--factors",
            "2",
            "--experiments",
            "4",
            "--seed",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.specification, vec![2, 2, 2]);
        assert_eq!(cli.factors, 2);
        assert_eq!(cli.experiments, 4);
        assert_eq!(cli.seed, Some(4));
        assert!(cli.seed_policy.is_none());
    }

    #[test]
    fn test_comma_separated_specification() {
        let cli = Cli::try_parse_from([
            "combidoe",
            "--experiments",
            "12",
            "--factors",
            "2",
            "--specification",
            "2,3,4",
        ])
        .unwrap();
        assert_eq!(cli.specification, vec![2, 3, 4]);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_required_arguments() {
        assert!(Cli::try_parse_from(["combidoe", "--factors", "2", "--experiments", "4"]).is_err());
        assert!(Cli::try_parse_from(["combidoe", "--specification", "2", "2"]).is_err());
    }

    #[test]
    fn test_seed_policy_values() {
        let cli = Cli::try_parse_from([
            "combidoe",
            "--experiments",
            "4",
            "--factors",
            "2",
            "--specification",
            "2",
            "2",
            "--seed-policy",
            "first-attempt",
        ])
        .unwrap();
        assert_eq!(cli.seed_policy, Some(SeedPolicyArg::FirstAttempt));
        assert_eq!(SeedPolicy::from(SeedPolicyArg::PerRun), SeedPolicy::PerRun);
    }
}
