//! combidoe CLI - Main Entry Point
//!
//! Brute-force covering-array generator for combinatorial test design.

use clap::Parser;

use combidoe_cli::output::{print_error, print_solution, print_success, print_warning};
use combidoe_cli::{execute, Cli, Config, ConfigError, RunOutcome, RunSettings, SolutionReport};

/// Exit status for invalid input (matches clap's usage errors)
const EXIT_INVALID: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the solution
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&e.to_string());
            if e.downcast_ref::<combidoe_common::Error>().is_some()
                || e.downcast_ref::<ConfigError>().is_some()
            {
                EXIT_INVALID
            } else {
                1
            }
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::discover(cli.config.as_deref())?;
    let settings = RunSettings::resolve(cli, config)?;
    let format = settings.format;

    let outcome = execute(settings).await?;
    match &outcome {
        RunOutcome::Solved { design, solution } => {
            print_solution(&SolutionReport::new(design, solution), format)?;
            print_success(&format!("covering array found on attempt #{}", solution.attempt));
        }
        RunOutcome::Exhausted { attempts } => {
            print_warning(&format!("no solution found after {} attempts", attempts));
        }
        RunOutcome::Interrupted { attempts } => {
            print_warning(&format!("interrupted after {} attempts", attempts));
        }
    }

    Ok(outcome.exit_code())
}
