//! HTTP client for the EuropePMC REST search API.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::EpmcError;
use crate::types::{Article, SearchPage, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest/";

/// Hard cap on followed cursor pages per query. Prevents infinite loops on
/// cycling cursor marks.
const MAX_PAGES: usize = 1_000;

/// Client for the EuropePMC search endpoint.
///
/// Use [`EpmcClient::new`] for production or [`EpmcClient::with_base_url`]
/// to point at a mock server in tests.
pub struct EpmcClient {
    client: Client,
    base_url: Url,
}

impl EpmcClient {
    /// Creates a client pointed at the production EuropePMC API.
    ///
    /// # Errors
    ///
    /// Returns [`EpmcError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, EpmcError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`EpmcError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`EpmcError::UnexpectedStatus`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, EpmcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so join() appends the
        // `search` segment instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| EpmcError::UnexpectedStatus {
            status: 0,
            url: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches one page of search results.
    ///
    /// `cursor` is the cursor mark returned by the previous page, or `None`
    /// for the first page (sent as `*` per the API convention).
    ///
    /// # Errors
    ///
    /// - [`EpmcError::Http`] on network failure.
    /// - [`EpmcError::UnexpectedStatus`] on a non-2xx response.
    /// - [`EpmcError::Deserialize`] if the body does not match the expected
    ///   envelope.
    pub async fn search_page(
        &self,
        query: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<SearchPage, EpmcError> {
        let url = self.search_url(query, page_size, cursor);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EpmcError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| EpmcError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;

        let articles: Vec<Article> = parsed
            .result_list
            .result
            .into_iter()
            .filter_map(|raw| {
                let article = raw.into_article();
                if article.is_none() {
                    tracing::warn!(query, "dropping search result without pmid or id");
                }
                article
            })
            .collect();

        // The API signals exhaustion by repeating the cursor it was given.
        let next_cursor = parsed
            .next_cursor_mark
            .filter(|next| Some(next.as_str()) != cursor && !articles.is_empty());

        Ok(SearchPage {
            articles,
            next_cursor,
            hit_count: parsed.hit_count,
        })
    }

    /// Fetches every page for `query`, following cursor marks until the
    /// listing is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::search_page`], and returns
    /// [`EpmcError::PageLimit`] if more than [`MAX_PAGES`] pages are seen.
    pub async fn search_all(&self, query: &str, page_size: u32) -> Result<Vec<Article>, EpmcError> {
        let mut articles: Vec<Article> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(EpmcError::PageLimit {
                    query: query.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let page = self
                .search_page(query, page_size, cursor.as_deref())
                .await?;

            tracing::debug!(
                query,
                page = page_count,
                fetched = page.articles.len(),
                hit_count = page.hit_count,
                "fetched search page"
            );

            articles.extend(page.articles);

            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        Ok(articles)
    }

    /// Builds the search URL with JSON output and full (`core`) result
    /// metadata, which carries abstract text.
    fn search_url(&self, query: &str, page_size: u32, cursor: Option<&str>) -> Url {
        let mut url = self
            .base_url
            .join("search")
            .expect("joining a fixed segment onto a validated base cannot fail");
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("format", "json")
            .append_pair("resultType", "core")
            .append_pair("pageSize", &page_size.to_string())
            .append_pair("cursorMark", cursor.unwrap_or("*"));
        url
    }
}

/// Substitutes `{from}` and `{to}` placeholders in a query template with a
/// date range, the convention used by stored query files.
#[must_use]
pub fn substitute_date_range(template: &str, from: &str, to: &str) -> String {
    template.replace("{from}", from).replace("{to}", to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base: &str) -> EpmcClient {
        EpmcClient::with_base_url(30, "bioinv/0.1 (test)", base).expect("client should build")
    }

    #[test]
    fn search_url_includes_cursor_and_page_size() {
        let client = test_client("http://localhost:9");
        let url = client.search_url("cancer", 25, Some("AoIIP4"));
        let s = url.to_string();
        assert!(s.starts_with("http://localhost:9/search?"), "got: {s}");
        assert!(s.contains("query=cancer"));
        assert!(s.contains("pageSize=25"));
        assert!(s.contains("cursorMark=AoIIP4"));
        assert!(s.contains("resultType=core"));
    }

    #[test]
    fn search_url_defaults_cursor_to_star() {
        let client = test_client("http://localhost:9");
        let url = client.search_url("cancer", 25, None);
        assert!(url.to_string().contains("cursorMark=*"));
    }

    #[test]
    fn base_url_trailing_slashes_are_normalised() {
        let client = test_client("http://localhost:9///");
        let url = client.search_url("x", 1, None);
        assert!(url.to_string().starts_with("http://localhost:9/search?"));
    }

    #[test]
    fn substitutes_date_placeholders() {
        let q = substitute_date_range(
            "(ABSTRACT:\"database\") AND (FIRST_PDATE:[{from} TO {to}])",
            "2011-01-01",
            "2021-12-31",
        );
        assert_eq!(
            q,
            "(ABSTRACT:\"database\") AND (FIRST_PDATE:[2011-01-01 TO 2021-12-31])"
        );
    }
}
