//! Wayback Machine snapshot lookup.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::CheckError;

const DEFAULT_BASE_URL: &str = "http://archive.org/";

/// Client for the Wayback Machine availability API.
///
/// Asks whether a snapshot of a URL exists; dead URLs may still have one,
/// so the lookup runs regardless of the live-check outcome. Failures
/// degrade to `None` — the archive lookup never fails a verification.
pub struct ArchiveClient {
    client: Client,
    base_url: Url,
}

impl ArchiveClient {
    /// Creates a client pointed at the production availability API.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CheckError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CheckError::InvalidUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CheckError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CheckError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Returns the closest archived snapshot URL for `url`, or `None` when
    /// no snapshot exists or the API is unreachable.
    pub async fn lookup(&self, url: &str) -> Option<String> {
        let mut request_url = self
            .base_url
            .join("wayback/available")
            .expect("joining a fixed segment onto a validated base cannot fail");
        request_url.query_pairs_mut().append_pair("url", url);

        let response = match self.client.get(request_url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(url, status = response.status().as_u16(),
                    "archive availability API returned non-success status");
                return None;
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "archive availability request failed");
                return None;
            }
        };

        let body: Value = response.json().await.ok()?;
        let snapshot_url = body
            .get("archived_snapshots")?
            .get("closest")?
            .get("url")?
            .as_str()?;
        Some(snapshot_url.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client(base_url: &str) -> ArchiveClient {
        ArchiveClient::with_base_url(5, "bioinv/0.1 (test)", base_url)
            .expect("client should build")
    }

    #[tokio::test]
    async fn returns_closest_snapshot_url() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "url": "example.com",
            "archived_snapshots": {
                "closest": {
                    "status": "200",
                    "available": true,
                    "url": "http://web.archive.org/web/20210801000000/http://example.com/",
                    "timestamp": "20210801000000"
                }
            }
        });
        Mock::given(method("GET"))
            .and(path("/wayback/available"))
            .and(query_param("url", "http://example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let snapshot = test_client(&server.uri())
            .lookup("http://example.com")
            .await;
        assert_eq!(
            snapshot.as_deref(),
            Some("http://web.archive.org/web/20210801000000/http://example.com/")
        );
    }

    #[tokio::test]
    async fn empty_snapshots_object_is_none() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "url": "aegkbnwefnb", "archived_snapshots": {} });
        Mock::given(method("GET"))
            .and(path("/wayback/available"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        assert!(test_client(&server.uri()).lookup("aegkbnwefnb").await.is_none());
    }

    #[tokio::test]
    async fn api_error_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wayback/available"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(test_client(&server.uri())
            .lookup("http://example.com")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wayback/available"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(test_client(&server.uri())
            .lookup("http://example.com")
            .await
            .is_none());
    }
}
