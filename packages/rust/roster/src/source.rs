//! Roster page retrieval and lifter-link extraction.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use rosterscout_shared::{Result, RosterEntry, RosterScoutError};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// CSS selector matching athlete links on a roster page.
pub const LIFTER_LINK_SELECTOR: &str = r#"a[href*="/lifter/"]"#;

/// User-Agent string for roster requests.
const USER_AGENT: &str = concat!("RosterScout/", env!("CARGO_PKG_VERSION"));

/// Supplies a roster as an ordered list of [`RosterEntry`].
pub struct RosterSource {
    client: Client,
}

impl RosterSource {
    /// Create a roster source whose page loads give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| RosterScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch the roster page at `url` and extract its lifter links.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<Vec<RosterEntry>> {
        info!("loading roster page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| RosterScoutError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RosterScoutError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RosterScoutError::Network(format!("{url}: body read failed: {e}")))?;

        let entries = parse_roster(&body, url);
        if entries.is_empty() {
            warn!("no lifter links found; the page may require client-side rendering");
        }
        info!(entries = entries.len(), "roster loaded");
        Ok(entries)
    }

    /// Extract lifter links from a saved roster page; relative links resolve against `base`.
    pub fn load_file(path: &Path, base: &Url) -> Result<Vec<RosterEntry>> {
        let html = std::fs::read_to_string(path).map_err(|e| RosterScoutError::io(path, e))?;
        let entries = parse_roster(&html, base);
        debug!(path = %path.display(), entries = entries.len(), "roster loaded from file");
        Ok(entries)
    }
}

/// Extract `(label, link)` pairs from every lifter anchor, in document order.
///
/// Anchors with blank text or an unresolvable href are skipped.
pub fn parse_roster(html: &str, base: &Url) -> Vec<RosterEntry> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse(LIFTER_LINK_SELECTOR).unwrap();

    doc.select(&link_sel)
        .filter_map(|el| {
            let label = el.text().collect::<String>().trim().to_string();
            let href = el.value().attr("href")?;
            if label.is_empty() {
                return None;
            }
            let link = base.join(href).ok()?;
            Some(RosterEntry::new(label, link.to_string()))
        })
        .collect()
}
