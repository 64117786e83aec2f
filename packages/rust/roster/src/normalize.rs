//! Canonical roster URL handling.

use std::sync::LazyLock;

use regex::Regex;
use rosterscout_shared::{Result, RosterScoutError};
use url::Url;

/// Host that every canonical roster URL points at.
pub const ROSTER_HOST: &str = "liftingcast.com";

/// Matches the `/meets/<id>` path segment anywhere in a URL.
static MEET_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/meets/([^/?#]+)").expect("meet id regex"));

/// Extract the opaque meet identifier from a `/meets/<id>` segment.
pub fn meet_id(url: &str) -> Result<String> {
    let trimmed = url.trim();
    MEET_ID_RE
        .captures(trimmed)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| {
            RosterScoutError::invalid_input(format!(
                "not a meet URL (expected a /meets/<id> segment): {trimmed}"
            ))
        })
}

/// Rewrite any meet URL to `https://liftingcast.com/meets/<id>/roster`.
///
/// Results pages, lifter pages and bare meet URLs all map to the same roster
/// page. Normalising an already-canonical URL returns it unchanged.
pub fn normalize_roster_url(url: &str) -> Result<Url> {
    let id = meet_id(url)?;
    Url::parse(&format!("https://{ROSTER_HOST}/meets/{id}/roster")).map_err(|e| {
        RosterScoutError::invalid_input(format!("meet id '{id}' does not form a valid URL: {e}"))
    })
}
