//! Concurrent roster enrichment: roster entries → person records.
//!
//! One [`ProfileFetcher`] (and so one connection pool) is created per run and
//! shared by every lookup task. A semaphore bounds how many roster entries
//! resolve at once. Each task carries its roster index and its outcome is
//! written into that slot, so completion order never affects output order.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{info, instrument, warn};

use rosterscout_lookup::{ProfileFetcher, clean_name, resolve};
use rosterscout_shared::{LookupConfig, LookupOutcome, PersonRecord, Result, RosterEntry, RunId};

/// Summary of a completed enrichment run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: RunId,
    /// Roster entries processed.
    pub total: usize,
    /// Entries whose profile was found.
    pub matched: usize,
    /// Highest number of entries resolving at the same moment.
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each lookup completes, in completion order.
    fn lookup_finished(&self, name: &str, found: bool, completed: usize, total: usize);
    /// Called once per run, after the last lookup, when the connection pool is dropped.
    fn pool_released(&self) {}
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn lookup_finished(&self, _name: &str, _found: bool, _completed: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Enrich every roster entry, returning one record per entry in roster order.
///
/// Only failure to set up the shared HTTP client is an error; individual
/// lookups that find nothing produce records with no profile or history.
#[instrument(skip_all, fields(run_id = tracing::field::Empty, entries = entries.len()))]
pub async fn run(
    entries: &[RosterEntry],
    config: &LookupConfig,
    progress: &dyn ProgressReporter,
) -> Result<(RunSummary, Vec<PersonRecord>)> {
    let start = Instant::now();
    let run_id = RunId::new();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));

    let names: Vec<String> = entries.iter().map(|e| clean_name(&e.raw_label)).collect();
    let total = names.len();

    let fetcher = Arc::new(ProfileFetcher::new(config)?);
    let semaphore = Arc::new(Semaphore::new(config.max_in_flight));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    info!(
        %run_id,
        total,
        max_in_flight = config.max_in_flight,
        fetch_timeout_ms = config.fetch_timeout.as_millis(),
        database = %config.database,
        "starting lookups"
    );
    progress.phase("Looking up profiles");

    let mut tasks = JoinSet::new();
    let mut slot_of: HashMap<Id, usize> = HashMap::with_capacity(total);
    for (index, name) in names.iter().enumerate() {
        let name = name.clone();
        let fetcher = Arc::clone(&fetcher);
        let sem = Arc::clone(&semaphore);
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);

        let handle = tasks.spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return (index, LookupOutcome::NotFound);
            };

            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);

            let outcome = resolve(&name, &fetcher).await;

            in_flight.fetch_sub(1, Ordering::SeqCst);
            (index, outcome)
        });
        slot_of.insert(handle.id(), index);
    }

    let slots = gather(tasks, &slot_of, &names, progress).await;

    // Every task has been joined, so no clone of the fetcher survives.
    match Arc::try_unwrap(fetcher) {
        Ok(fetcher) => {
            drop(fetcher);
            progress.pool_released();
        }
        Err(shared) => {
            warn!(handles = Arc::strong_count(&shared), "connection pool still shared at run end");
        }
    }

    let records: Vec<PersonRecord> = entries
        .iter()
        .zip(names)
        .zip(slots)
        .map(|((entry, name), slot)| {
            PersonRecord::new(
                name,
                entry.profile_link.clone(),
                slot.unwrap_or(LookupOutcome::NotFound),
            )
        })
        .collect();

    let summary = RunSummary {
        run_id,
        total,
        matched: records.iter().filter(|r| r.is_matched()).count(),
        peak_in_flight: peak.load(Ordering::SeqCst),
        elapsed: start.elapsed(),
    };

    info!(
        matched = summary.matched,
        not_found = summary.total - summary.matched,
        peak_in_flight = summary.peak_in_flight,
        duration_ms = summary.elapsed.as_millis(),
        "lookups completed"
    );
    progress.done(&summary);

    Ok((summary, records))
}

/// Join every lookup task, placing each outcome at its roster index.
///
/// A task that panicked leaves its slot empty but still counts as completed.
async fn gather(
    mut tasks: JoinSet<(usize, LookupOutcome)>,
    slot_of: &HashMap<Id, usize>,
    names: &[String],
    progress: &dyn ProgressReporter,
) -> Vec<Option<LookupOutcome>> {
    let total = names.len();
    let mut slots: Vec<Option<LookupOutcome>> = vec![None; total];
    let mut completed = 0;

    while let Some(joined) = tasks.join_next().await {
        completed += 1;
        match joined {
            Ok((index, outcome)) => {
                progress.lookup_finished(&names[index], outcome.is_found(), completed, total);
                slots[index] = Some(outcome);
            }
            Err(e) => {
                let name = slot_of
                    .get(&e.id())
                    .and_then(|&index| names.get(index))
                    .map_or("", String::as_str);
                warn!(name, error = %e, "lookup task failed");
                progress.lookup_finished(name, false, completed, total);
            }
        }
    }

    slots
}
