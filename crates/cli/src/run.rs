//! Search execution
//!
//! The search runs on a blocking task. A ticker task mirrors the attempt
//! counter into a spinner, and Ctrl-C flips a cancel flag the search checks
//! between attempts.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use combidoe_common::{search_parallel, AttemptOutcome, Design, Search, Solution};

use crate::config::RunSettings;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Solved { design: Design, solution: Solution },
    Exhausted { attempts: u64 },
    Interrupted { attempts: u64 },
}

impl RunOutcome {
    /// Process exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Solved { .. } => 0,
            RunOutcome::Exhausted { .. } => 3,
            RunOutcome::Interrupted { .. } => 130,
        }
    }
}

/// Validate the design and search until solved, exhausted or interrupted.
pub async fn execute(settings: RunSettings) -> Result<RunOutcome> {
    let design = Design::new(
        settings.specification.clone(),
        settings.factors,
        settings.experiments,
    )
    .map_err(combidoe_common::Error::from)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let attempts = Arc::new(AtomicU64::new(0));

    let spinner = if settings.verbose {
        ProgressBar::hidden()
    } else {
        spinner()
    };
    let ticker = tokio::spawn({
        let spinner = spinner.clone();
        let attempts = attempts.clone();
        async move {
            let mut interval = tokio::time::interval(Duration::from_millis(100));
            loop {
                interval.tick().await;
                spinner.set_message(format!("attempt #{}", attempts.load(Ordering::Relaxed)));
            }
        }
    });

    let task = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        let attempts = attempts.clone();
        move || run_search(design, &settings, &cancel, &attempts)
    });
    let outcome = supervise(task, &cancel, tokio::signal::ctrl_c()).await?;

    ticker.abort();
    spinner.finish_and_clear();
    Ok(outcome)
}

/// Wait for the search task, cancelling it when `interrupt` resolves.
///
/// An interrupt source that fails to install is logged and ignored.
async fn supervise<S>(
    mut task: JoinHandle<RunOutcome>,
    cancel: &AtomicBool,
    interrupt: S,
) -> Result<RunOutcome>
where
    S: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(interrupt);
    let mut listening = true;
    loop {
        tokio::select! {
            joined = &mut task => return Ok(joined?),
            signal = &mut interrupt, if listening => match signal {
                Ok(()) => {
                    cancel.store(true, Ordering::Relaxed);
                    warn!("interrupt received, stopping search");
                    return Ok(task.await?);
                }
                Err(e) => {
                    warn!(error = %e, "cannot listen for Ctrl-C, search is not interruptible");
                    listening = false;
                }
            },
        }
    }
}

/// Blocking search driver used by [`execute`].
pub fn run_search(
    design: Design,
    settings: &RunSettings,
    cancel: &AtomicBool,
    attempts: &AtomicU64,
) -> RunOutcome {
    if settings.workers > 1 {
        info!(workers = settings.workers, "searching in parallel");
        let solution = search_parallel(&design, &settings.search, settings.workers, cancel, attempts);
        let attempts = attempts.load(Ordering::Relaxed);
        return match solution {
            Some(solution) => RunOutcome::Solved { design, solution },
            None if cancel.load(Ordering::Relaxed) => RunOutcome::Interrupted { attempts },
            None => RunOutcome::Exhausted { attempts },
        };
    }

    let report_design = design.clone();
    let mut search = Search::new(design, &settings.search);
    info!(run_seed = search.run_seed(), "searching");

    for outcome in search.by_ref() {
        let attempt = outcome.attempt();
        attempts.store(attempt, Ordering::Relaxed);
        match outcome {
            AttemptOutcome::Solved(solution) => {
                return RunOutcome::Solved {
                    design: report_design,
                    solution,
                };
            }
            AttemptOutcome::Uncovered { gap, .. } => {
                if attempt % settings.progress_interval == 0 {
                    info!("Solution Not Found - Try #{} ({})", attempt + 1, gap);
                }
            }
        }
        if cancel.load(Ordering::Relaxed) {
            return RunOutcome::Interrupted { attempts: attempt };
        }
    }

    warn!(attempts = search.attempts(), "attempt budget exhausted");
    RunOutcome::Exhausted {
        attempts: search.attempts(),
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} searching: {msg} ({elapsed})") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
