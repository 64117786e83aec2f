//! End-to-end report: meet URL → roster → enriched records.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};

use rosterscout_roster::{RosterSource, normalize_roster_url};
use rosterscout_shared::{LookupConfig, Report, Result, RosterEntry};

use crate::pipeline::{self, ProgressReporter};

/// Where the roster for a report comes from.
#[derive(Debug, Clone)]
pub enum RosterInput {
    /// Fetch the canonical roster page over HTTP.
    Fetch { timeout: Duration },
    /// Parse a saved copy of the roster page.
    File(PathBuf),
    /// Entries already extracted by another roster source.
    Entries(Vec<RosterEntry>),
}

/// Build a timestamped report for the meet at `meet_url`.
///
/// The URL is normalised first; a URL without a meet id fails before any
/// network activity.
#[instrument(skip_all, fields(meet_url = %meet_url))]
pub async fn build_report(
    meet_url: &str,
    roster: RosterInput,
    config: &LookupConfig,
    progress: &dyn ProgressReporter,
) -> Result<Report> {
    let roster_url = normalize_roster_url(meet_url)?;
    config.validate()?;

    progress.phase("Loading roster");
    let entries = match roster {
        RosterInput::Fetch { timeout } => RosterSource::new(timeout)?.fetch(&roster_url).await?,
        RosterInput::File(path) => RosterSource::load_file(&path, &roster_url)?,
        RosterInput::Entries(entries) => entries,
    };
    info!(%roster_url, entries = entries.len(), "roster ready");

    let (summary, people) = pipeline::run(&entries, config, progress).await?;

    Ok(Report {
        meet_url: roster_url.to_string(),
        run_id: summary.run_id,
        generated_at: Utc::now(),
        people,
    })
}
