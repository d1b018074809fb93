//! Configuration file and flag merging
//!
//! Settings come from `combidoe.toml` (or `--config`) and are overridden by
//! command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use combidoe_common::{SearchConfig, SeedPolicy};

use crate::args::Cli;
use crate::output::OutputFormat;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "combidoe.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("workers must be at least 1")]
    NoWorkers,

    #[error("progress_interval must be at least 1")]
    NoProgressInterval,
}

/// File configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchSection,
    pub output: OutputSection,
}

/// `[search]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub seed: Option<u64>,
    pub seed_policy: SeedPolicy,
    pub max_attempts: Option<u64>,
    pub workers: usize,
    /// Log a progress line every this many failed attempts
    pub progress_interval: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            seed: None,
            seed_policy: SeedPolicy::PerRun,
            max_attempts: None,
            workers: 1,
            progress_interval: 1000,
        }
    }
}

/// `[output]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load an explicit file, which must exist, or the default file if present.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub specification: Vec<u32>,
    pub factors: usize,
    pub experiments: usize,
    pub search: SearchConfig,
    pub workers: usize,
    pub progress_interval: u64,
    pub format: OutputFormat,
    pub verbose: bool,
}

impl RunSettings {
    /// Merge flags over file configuration
    pub fn resolve(cli: Cli, config: Config) -> Result<Self, ConfigError> {
        let workers = cli.workers.unwrap_or(config.search.workers);
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if config.search.progress_interval == 0 {
            return Err(ConfigError::NoProgressInterval);
        }

        Ok(Self {
            specification: cli.specification,
            factors: cli.factors,
            experiments: cli.experiments,
            search: SearchConfig {
                seed: cli.seed.or(config.search.seed),
                policy: cli
                    .seed_policy
                    .map(SeedPolicy::from)
                    .unwrap_or(config.search.seed_policy),
                max_attempts: cli.max_attempts.or(config.search.max_attempts),
            },
            workers,
            progress_interval: config.search.progress_interval,
            format: cli.format.unwrap_or(config.output.format),
            verbose: cli.verbose,
        })
    }
}
