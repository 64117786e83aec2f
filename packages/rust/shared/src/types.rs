//! Core domain types for roster enrichment.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::config::Database;

/// Column key that squat attempts are stored under in a [`ResultRow`].
pub const SQUAT_KEY: &str = "Squat";
/// Column key that bench attempts are stored under in a [`ResultRow`].
pub const BENCH_KEY: &str = "Bench";
/// Column key that deadlift attempts are stored under in a [`ResultRow`].
pub const DEADLIFT_KEY: &str = "Deadlift";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RosterEntry
// ---------------------------------------------------------------------------

/// One row of a competition roster, as scraped from the roster page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Link text, e.g. `"105 - Anthony Hill"`.
    pub raw_label: String,
    /// Absolute URL of the athlete's roster page.
    pub profile_link: String,
}

impl RosterEntry {
    pub fn new(raw_label: impl Into<String>, profile_link: impl Into<String>) -> Self {
        Self {
            raw_label: raw_label.into(),
            profile_link: profile_link.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultRow
// ---------------------------------------------------------------------------

/// One competition result from an athlete's history table.
///
/// `cells` maps column header to cell text. The per-lift attempt columns are
/// lifted out into typed attempt lists and serialised under the fixed
/// `Squat`/`Bench`/`Deadlift` keys, replacing any raw text under those keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(flatten)]
    pub cells: BTreeMap<String, String>,
    #[serde(rename = "Squat", default)]
    pub squat: Vec<f64>,
    #[serde(rename = "Bench", default)]
    pub bench: Vec<f64>,
    #[serde(rename = "Deadlift", default)]
    pub deadlift: Vec<f64>,
}

impl ResultRow {
    /// Cell text for a column, if the row has one.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// LookupOutcome
// ---------------------------------------------------------------------------

/// Terminal result of resolving one athlete against the results database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// A candidate identifier resolved to a profile with a results table.
    Found {
        profile_url: String,
        history: Vec<ResultRow>,
    },
    /// Every candidate identifier failed.
    NotFound,
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

// ---------------------------------------------------------------------------
// PersonRecord
// ---------------------------------------------------------------------------

/// Final, per-athlete output of a pipeline run.
///
/// `profile_url` and `history` are both `None` when no profile was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Cleaned display name.
    pub name: String,
    /// Link back to the athlete's roster page.
    pub roster_link: String,
    pub profile_url: Option<String>,
    pub history: Option<Vec<ResultRow>>,
}

impl PersonRecord {
    /// Zip a roster entry's derived name and link with its lookup outcome.
    pub fn new(name: String, roster_link: String, outcome: LookupOutcome) -> Self {
        let (profile_url, history) = match outcome {
            LookupOutcome::Found {
                profile_url,
                history,
            } => (Some(profile_url), Some(history)),
            LookupOutcome::NotFound => (None, None),
        };
        Self {
            name,
            roster_link,
            profile_url,
            history,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.profile_url.is_some()
    }

    /// Name-search page on `database` for this athlete.
    pub fn search_url(&self, database: Database) -> Option<Url> {
        Url::parse_with_params(database.search_base(), &[("name", self.name.as_str())]).ok()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Timestamped payload handed to report consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Canonical roster URL the report was built from.
    pub meet_url: String,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    /// One record per roster entry, in roster order.
    pub people: Vec<PersonRecord>,
}

impl Report {
    /// Number of people with a matched profile.
    pub fn matched_count(&self) -> usize {
        self.people.iter().filter(|p| p.is_matched()).count()
    }
}
