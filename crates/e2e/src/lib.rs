//! combidoe E2E Test Framework
//!
//! Drives the `combidoe` binary through declarative YAML scenarios:
//! - Parses scenario specs (arguments plus expected outcome)
//! - Spawns the binary, optionally several times to check reproducibility
//! - Parses the printed covering array and re-verifies its coverage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                              │
//! │    ├── run_scenario(spec) -> ScenarioResult                  │
//! │    ├── invoke(args) -> Invocation (status, stdout, stderr)   │
//! │    └── check_expectation(spec, invocations)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                         │
//! │    ├── name, description, tags                               │
//! │    ├── args { specification, factors, experiments, seed }    │
//! │    ├── repeat                                                │
//! │    └── expect: solved | invalid | exhausted                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod runner;
pub mod scenario;

pub use error::{E2eError, E2eResult};
pub use runner::{ScenarioRunner, RunnerConfig};
pub use scenario::{Expectation, ScenarioSpec};
