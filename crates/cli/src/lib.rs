//! combidoe CLI
//!
//! Command-line front end for the covering-array search: argument and
//! config parsing, progress reporting, interruption and output rendering.

pub mod args;
pub mod config;
pub mod output;
pub mod run;

pub use args::Cli;
pub use config::{Config, ConfigError, RunSettings};
pub use output::{OutputFormat, SolutionReport};
pub use run::{execute, RunOutcome};
