//! Candidate-identifier fallback for a single athlete.

use rosterscout_shared::LookupOutcome;
use tracing::{info, instrument, warn};

use crate::fetcher::ProfileFetcher;
use crate::names::candidate_identifiers;

/// Resolve a display name to a profile, trying candidates in order.
///
/// The first candidate that fetches and parses wins; later candidates are not
/// tried. Fetch failures are logged and never escape. An empty name resolves
/// to [`LookupOutcome::NotFound`] without any request.
#[instrument(skip(fetcher), fields(name = %display_name))]
pub async fn resolve(display_name: &str, fetcher: &ProfileFetcher) -> LookupOutcome {
    if display_name.trim().is_empty() {
        warn!("empty name, skipping lookup");
        return LookupOutcome::NotFound;
    }

    let candidates = candidate_identifiers(display_name);
    info!(candidates = candidates.len(), "looking up profile");

    for candidate in &candidates {
        match fetcher.fetch(candidate).await {
            Ok(history) => {
                let profile_url = fetcher.profile_url(candidate).to_string();
                info!(%candidate, %profile_url, rows = history.len(), "profile found");
                return LookupOutcome::Found {
                    profile_url,
                    history,
                };
            }
            Err(e) => {
                let url = fetcher.profile_url(candidate);
                warn!(%candidate, %url, error = %e, "candidate failed");
            }
        }
    }

    warn!("no profile found");
    LookupOutcome::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rosterscout_shared::LookupConfig;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROFILE: &str = r#"<html><body>
        <table><tr><th>Best</th></tr><tr><td>600</td></tr></table>
        <table>
            <tr><th>Place</th><th>Squat</th><th>Total</th></tr>
            <tr><td>1</td><td class="squat">200</td><td>600</td></tr>
        </table>
    </body></html>"#;

    fn fetcher_for(server: &MockServer) -> ProfileFetcher {
        let config = LookupConfig {
            base_url: Url::parse(&format!("{}/u/", server.uri())).unwrap(),
            fetch_timeout: Duration::from_secs(5),
            ..LookupConfig::for_database(Default::default())
        };
        ProfileFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn falls_back_to_third_candidate() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/u/maryjanesmith"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/u/mary-janesmith"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/u/mary-jane-smith"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        let outcome = resolve("Mary-Jane Smith", &fetcher).await;

        match outcome {
            LookupOutcome::Found {
                profile_url,
                history,
            } => {
                assert_eq!(profile_url, format!("{}/u/mary-jane-smith", server.uri()));
                assert_eq!(history.len(), 1);
                assert_eq!(history[0].squat, vec![200.0]);
            }
            LookupOutcome::NotFound => panic!("expected Found"),
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/u/anthonyhill"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/u/anthony-hill"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        assert!(resolve("Anthony Hill", &fetcher).await.is_found());
    }

    #[tokio::test]
    async fn unparseable_page_counts_as_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/u/anthonyhill"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>no tables</p>"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/u/anthony-hill"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        match resolve("Anthony Hill", &fetcher).await {
            LookupOutcome::Found { profile_url, .. } => {
                assert!(profile_url.ends_with("/u/anthony-hill"));
            }
            LookupOutcome::NotFound => panic!("expected Found"),
        }
    }

    #[tokio::test]
    async fn all_candidates_failing_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        assert_eq!(resolve("Anthony Hill", &fetcher).await, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn empty_name_makes_no_requests() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server);
        assert_eq!(resolve("", &fetcher).await, LookupOutcome::NotFound);
        assert_eq!(resolve("   ", &fetcher).await, LookupOutcome::NotFound);
    }
}
