//! E2E test harness entry point
//!
//! This file is the test binary that runs scenarios from YAML specs.
//! Run with: cargo test --package combidoe-e2e --test e2e
//! The `combidoe` binary must already be built; a missing binary fails the run.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use combidoe_e2e::{E2eResult, RunnerConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "combidoe-e2e")]
#[command(about = "E2E scenario runner for combidoe")]
struct Args {
    /// Path to scenario specs directory
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Path to the combidoe binary
    #[arg(long, env = "COMBIDOE_BIN")]
    binary: Option<PathBuf>,

    /// Per-invocation timeout in seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // cargo test passes libtest flags such as --nocapture; ignore what we don't know
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => Args::parse_from(["combidoe-e2e"]),
    };

    let root = workspace_root();
    let binary = args.binary.clone().unwrap_or_else(|| {
        let target = std::env::var_os("CARGO_TARGET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join("target"));
        target.join("debug").join("combidoe")
    });
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main(args, binary, root)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args, binary: PathBuf, root: PathBuf) -> E2eResult<bool> {
    let config = RunnerConfig {
        binary_path: binary,
        scenarios_dir: args
            .scenarios
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/scenarios")),
        output_dir: args.output.unwrap_or_else(|| root.join("target/e2e-results")),
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let runner = ScenarioRunner::new(config)?;

    if let Some(name) = args.name {
        let result = runner.run_named(&name).await?;
        if let Some(error) = &result.error {
            eprintln!("✗ {}: {}", result.name, error);
        }
        return Ok(result.success);
    }

    let suite = match args.tag {
        Some(tag) => runner.run_tagged(&tag).await?,
        None => runner.run_all().await?,
    };
    runner.write_results(&suite)?;

    Ok(suite.failed == 0)
}
