//! Multi-worker search
//!
//! Worker `w` of `n` evaluates attempts `w + 1, w + 1 + n, ...` with the
//! same per-attempt seeds as the sequential driver. Workers stop once their
//! next attempt is past the lowest solved one, so the winner is always the
//! lowest-numbered covering attempt: under [`SeedPolicy::PerRun`] that is
//! exactly what [`crate::search::search`] returns for the same run seed.
//!
//! [`SeedPolicy::PerRun`]: crate::search::SeedPolicy::PerRun

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::generate::time_seed;
use crate::search::{evaluate_attempt, AttemptOutcome, SearchConfig, Solution};
use crate::types::Design;

/// Search with `workers` threads until solved, exhausted or cancelled.
///
/// `attempts` is bumped once per evaluated attempt so callers can report
/// progress from another thread.
pub fn search_parallel(
    design: &Design,
    config: &SearchConfig,
    workers: usize,
    cancel: &AtomicBool,
    attempts: &AtomicU64,
) -> Option<Solution> {
    let workers = workers.max(1);
    let run_seed = config.seed.unwrap_or_else(time_seed);
    let limit = config.max_attempts.unwrap_or(u64::MAX);
    let best = AtomicU64::new(u64::MAX);
    let winner: Mutex<Option<Solution>> = Mutex::new(None);

    let work = |worker: u64| {
        let stride = workers as u64;
        let mut attempt = worker + 1;
        while attempt <= limit
            && attempt < best.load(Ordering::Acquire)
            && !cancel.load(Ordering::Relaxed)
        {
            let seed = config.policy.seed_for(run_seed, attempt);
            let outcome = evaluate_attempt(design, run_seed, attempt, seed);
            attempts.fetch_add(1, Ordering::Relaxed);

            if let AttemptOutcome::Solved(solution) = outcome {
                debug!(worker, attempt, "worker solved");
                let mut slot = winner.lock();
                if slot.as_ref().map_or(true, |s| solution.attempt < s.attempt) {
                    best.fetch_min(attempt, Ordering::AcqRel);
                    *slot = Some(solution);
                }
                return;
            }

            attempt = match attempt.checked_add(stride) {
                Some(next) => next,
                None => return,
            };
        }
    };

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.scope(|s| {
            for worker in 0..workers as u64 {
                let work = &work;
                s.spawn(move |_| work(worker));
            }
        }),
        Err(e) => {
            warn!("falling back to the global pool: {}", e);
            rayon::scope(|s| {
                for worker in 0..workers as u64 {
                    let work = &work;
                    s.spawn(move |_| work(worker));
                }
            });
        }
    }

    winner.into_inner()
}
