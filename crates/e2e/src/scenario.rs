//! Declarative YAML scenario specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Arguments passed to `combidoe`
    pub args: InvocationArgs,

    /// Run the binary this many times; every run must print the same output
    #[serde(default = "default_repeat")]
    pub repeat: usize,

    /// What the run must produce
    pub expect: Expectation,
}

fn default_repeat() -> usize {
    1
}

/// Command-line arguments of one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationArgs {
    pub specification: Vec<u32>,
    pub factors: usize,
    pub experiments: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub seed_policy: Option<String>,
    #[serde(default)]
    pub max_attempts: Option<u64>,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Expected result of a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Expectation {
    /// Exit 0 with a covering array
    Solved {
        /// Exact deduplicated rows, in printed order
        #[serde(default)]
        rows: Option<Vec<Vec<u32>>>,
        /// Printed run seed
        #[serde(default)]
        seed: Option<u64>,
        /// Upper bound on distinct rows printed
        #[serde(default)]
        max_rows: Option<usize>,
    },

    /// Exit 2 with a diagnostic
    Invalid {
        #[serde(default)]
        message_contains: Option<String>,
    },

    /// Exit 3 after the attempt budget runs out
    Exhausted,
}

impl InvocationArgs {
    /// Render as `combidoe` flags
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--specification".to_string()];
        args.extend(self.specification.iter().map(|d| d.to_string()));
        args.extend([
            "--factors".to_string(),
            self.factors.to_string(),
            "--experiments".to_string(),
            self.experiments.to_string(),
        ]);
        if let Some(seed) = self.seed {
            args.extend(["--seed".to_string(), seed.to_string()]);
        }
        if let Some(policy) = &self.seed_policy {
            args.extend(["--seed-policy".to_string(), policy.clone()]);
        }
        if let Some(max) = self.max_attempts {
            args.extend(["--max-attempts".to_string(), max.to_string()]);
        }
        if let Some(workers) = self.workers {
            args.extend(["--workers".to_string(), workers.to_string()]);
        }
        args
    }
}

impl ScenarioSpec {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        if spec.repeat == 0 {
            return Err(E2eError::ScenarioParse(format!(
                "{}: repeat must be at least 1",
                spec.name
            )));
        }
        Ok(spec)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            specs.push(Self::from_file(entry.path())?);
        }

        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}
