//! Profile page fetching and results-table extraction.
//!
//! A profile page is a hit only if it carries at least two `<table>` elements;
//! the first is a personal-best summary and the second is the competition
//! history. Row 0 of the history table is the header row. Attempt cells are
//! tagged with a `squat`, `bench` or `deadlift` class and hold either a number
//! or a failure marker.

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use rosterscout_shared::{
    BENCH_KEY, DEADLIFT_KEY, LookupConfig, ResultRow, RosterScoutError, SQUAT_KEY,
};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// User-Agent string for profile requests.
const USER_AGENT: &str = concat!("RosterScout/", env!("CARGO_PKG_VERSION"));

/// Index of the history table among the page's tables.
const RESULTS_TABLE_INDEX: usize = 1;

/// Why a single candidate identifier did not resolve.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure, including an elapsed per-request timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status; the identifier does not exist.
    #[error("HTTP {status} from {url}")]
    BadStatus { url: Url, status: StatusCode },

    /// The page has no history table.
    #[error("expected at least 2 tables, found {found}")]
    NoTable { found: usize },

    /// The history table has no rows at all.
    #[error("results table has no rows")]
    EmptyTable,
}

/// Fetches profile pages over one pooled HTTP client.
///
/// The client is the run's connection pool: cloned handles share connections,
/// and the pool is released when the last `ProfileFetcher` reference drops.
pub struct ProfileFetcher {
    client: Client,
    base_url: Url,
}

impl ProfileFetcher {
    /// Build the shared client. Failure here is fatal to the run.
    pub fn new(config: &LookupConfig) -> rosterscout_shared::Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| RosterScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %config.base_url, "connection pool created");

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Profile URL for a candidate identifier.
    ///
    /// The identifier is pushed as a single, percent-encoded path segment.
    pub fn profile_url(&self, candidate: &str) -> Url {
        let mut url = self.base_url.clone();
        // `LookupConfig::validate` rejects cannot-be-a-base URLs.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(candidate);
        }
        url
    }

    /// Fetch the profile for `candidate` and parse its history table.
    #[instrument(skip(self), fields(url = tracing::field::Empty))]
    pub async fn fetch(&self, candidate: &str) -> Result<Vec<ResultRow>, FetchError> {
        let url = self.profile_url(candidate);
        tracing::Span::current().record("url", tracing::field::display(&url));

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::BadStatus { url, status });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "profile page received");

        parse_history(&body)
    }
}

impl Drop for ProfileFetcher {
    fn drop(&mut self) {
        debug!(base_url = %self.base_url, "connection pool released");
    }
}

/// Parse the history table out of a profile page.
pub fn parse_history(html: &str) -> Result<Vec<ResultRow>, FetchError> {
    let doc = Html::parse_document(html);
    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td, th").unwrap();
    let squat_sel = Selector::parse("td.squat").unwrap();
    let bench_sel = Selector::parse("td.bench").unwrap();
    let deadlift_sel = Selector::parse("td.deadlift").unwrap();

    let tables: Vec<ElementRef> = doc.select(&table_sel).collect();
    let Some(table) = tables.get(RESULTS_TABLE_INDEX) else {
        return Err(FetchError::NoTable {
            found: tables.len(),
        });
    };

    let rows: Vec<ElementRef> = table.select(&row_sel).collect();
    let Some((header, data_rows)) = rows.split_first() else {
        return Err(FetchError::EmptyTable);
    };

    let keys: Vec<String> = header.select(&cell_sel).map(|cell| cell_text(&cell)).collect();

    let history = data_rows
        .iter()
        .map(|row| {
            let squat = extract_attempts(row.select(&squat_sel).map(|c| cell_text(&c)));
            let bench = extract_attempts(row.select(&bench_sel).map(|c| cell_text(&c)));
            let deadlift = extract_attempts(row.select(&deadlift_sel).map(|c| cell_text(&c)));

            // Later duplicate headers overwrite earlier ones; surplus cells are dropped.
            let mut cells: BTreeMap<String, String> = keys
                .iter()
                .cloned()
                .zip(row.select(&cell_sel).map(|c| cell_text(&c)))
                .collect();
            for key in [SQUAT_KEY, BENCH_KEY, DEADLIFT_KEY] {
                cells.remove(key);
            }

            ResultRow {
                cells,
                squat,
                bench,
                deadlift,
            }
        })
        .collect();

    Ok(history)
}

/// Numeric attempts from a lift's cell texts, in order.
///
/// Failure markers and other non-numeric cells are skipped, never zeroed.
pub fn extract_attempts<I, S>(cells: I) -> Vec<f64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .filter_map(|text| text.as_ref().trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn config_for(base: &str) -> LookupConfig {
        LookupConfig {
            base_url: Url::parse(base).unwrap(),
            fetch_timeout: Duration::from_secs(5),
            ..LookupConfig::for_database(Default::default())
        }
    }

    // -----------------------------------------------------------------------
    // Attempt extraction
    // -----------------------------------------------------------------------

    #[test]
    fn attempts_drop_non_numeric() {
        assert_eq!(
            extract_attempts(["100", "105", "FAIL", "110.5"]),
            vec![100.0, 105.0, 110.5]
        );
    }

    #[test]
    fn attempts_keep_order_and_signs() {
        assert_eq!(extract_attempts([" 120 ", "", "-125", "x"]), vec![120.0, -125.0]);
        assert!(extract_attempts(["NaN", "inf"]).is_empty());
        assert!(extract_attempts(Vec::<String>::new()).is_empty());
    }

    // -----------------------------------------------------------------------
    // Table parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_fixture_history() {
        let history = parse_history(&load_fixture("profile.html")).unwrap();
        assert_eq!(history.len(), 2);

        let first = &history[0];
        assert_eq!(first.get("Place"), Some("1"));
        assert_eq!(first.get("Meet"), Some("Spring Classic"));
        assert_eq!(first.get("Total"), Some("615.5"));
        assert_eq!(first.squat, vec![200.0, 207.5, -215.0]);
        assert_eq!(first.bench, vec![130.0, 135.0, 140.0]);
        assert_eq!(first.deadlift, vec![250.0, 260.5]);
        assert_eq!(first.get("Squat"), None);

        let second = &history[1];
        assert_eq!(second.get("Date"), Some("2023-10-14"));
        assert_eq!(second.squat, vec![190.0, 200.0]);
        assert_eq!(second.bench, vec![127.5, 132.5]);
    }

    #[test]
    fn single_table_is_no_table() {
        let html = "<html><body><table><tr><th>A</th></tr></table></body></html>";
        assert!(matches!(parse_history(html), Err(FetchError::NoTable { found: 1 })));
        assert!(matches!(
            parse_history("<p>nothing</p>"),
            Err(FetchError::NoTable { found: 0 })
        ));
    }

    #[test]
    fn rowless_table_is_empty() {
        let html = "<table><tr><td>x</td></tr></table><table></table>";
        assert!(matches!(parse_history(html), Err(FetchError::EmptyTable)));
    }

    #[test]
    fn header_only_table_yields_no_rows() {
        let html = "<table></table><table><tr><th>Place</th></tr></table>";
        assert!(parse_history(html).unwrap().is_empty());
    }

    #[test]
    fn short_rows_map_positionally() {
        let html = r#"<table></table><table>
            <tr><th>Place</th><th>Meet</th><th>Total</th></tr>
            <tr><td>2</td><td>Local</td></tr>
            <tr><th>DQ</th><td>Regional</td><td>0</td><td>extra</td></tr>
        </table>"#;
        let history = parse_history(html).unwrap();
        assert_eq!(history[0].cells.len(), 2);
        assert_eq!(history[0].get("Total"), None);
        assert_eq!(history[1].get("Place"), Some("DQ"));
        assert_eq!(history[1].cells.len(), 3);
    }

    // -----------------------------------------------------------------------
    // URL construction
    // -----------------------------------------------------------------------

    #[test]
    fn profile_url_appends_segment() {
        let fetcher = ProfileFetcher::new(&config_for("https://www.openipf.org/u/")).unwrap();
        assert_eq!(
            fetcher.profile_url("anthonyhill").as_str(),
            "https://www.openipf.org/u/anthonyhill"
        );
    }

    #[test]
    fn profile_url_encodes_segment() {
        let fetcher = ProfileFetcher::new(&config_for("https://www.openipf.org/u")).unwrap();
        assert_eq!(
            fetcher.profile_url("o'neil/x").as_str(),
            "https://www.openipf.org/u/o'neil%2Fx"
        );
    }

    // -----------------------------------------------------------------------
    // HTTP behaviour
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn fetch_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/u/anthonyhill"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(load_fixture("profile.html")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = ProfileFetcher::new(&config_for(&format!("{}/u/", server.uri()))).unwrap();
        let history = fetcher.fetch("anthonyhill").await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn fetch_not_found_is_bad_status() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ProfileFetcher::new(&config_for(&format!("{}/u/", server.uri()))).unwrap();
        let err = fetcher.fetch("nobody").await.unwrap_err();
        match &err {
            FetchError::BadStatus { url, status } => {
                assert_eq!(*status, StatusCode::NOT_FOUND);
                assert_eq!(url.as_str(), format!("{}/u/nobody", server.uri()));
            }
            other => panic!("expected bad status, got {other:?}"),
        }
        assert!(err.to_string().ends_with("/u/nobody"));
    }

    #[tokio::test]
    async fn fetch_timeout_is_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(load_fixture("profile.html"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut config = config_for(&format!("{}/u/", server.uri()));
        config.fetch_timeout = Duration::from_millis(200);
        let fetcher = ProfileFetcher::new(&config).unwrap();

        match fetcher.fetch("slowpoke").await {
            Err(FetchError::Network(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_unreachable_host_is_network_error() {
        // Bind then drop a listener so the port is very likely closed.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let fetcher =
            ProfileFetcher::new(&config_for(&format!("http://127.0.0.1:{port}/u/"))).unwrap();
        assert!(matches!(fetcher.fetch("anyone").await, Err(FetchError::Network(_))));
    }
}
