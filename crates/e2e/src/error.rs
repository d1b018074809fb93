//! Error types for E2E testing

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("combidoe binary not found at {0}. Build it with: cargo build -p combidoe-cli")]
    BinaryNotFound(String),

    #[error("Failed to spawn {binary}: {reason}")]
    Spawn { binary: String, reason: String },

    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
