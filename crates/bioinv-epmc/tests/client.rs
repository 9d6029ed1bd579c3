//! Integration tests for `EpmcClient` using wiremock HTTP mocks.

use bioinv_epmc::{EpmcClient, EpmcError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> EpmcClient {
    EpmcClient::with_base_url(30, "bioinv/0.1 (test)", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_page_returns_parsed_articles() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "hitCount": 2,
        "nextCursorMark": "AoIIP4AAACsz",
        "resultList": {
            "result": [
                {
                    "id": "34664389",
                    "pmid": "34664389",
                    "title": "MiRBase: a database of microRNA sequences",
                    "abstractText": "We present miRBase, a searchable database."
                },
                {
                    "id": "PPR400000",
                    "title": "A preprint without a PMID",
                    "abstractText": "Preprint abstract."
                }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "biodata"))
        .and(query_param("format", "json"))
        .and(query_param("cursorMark", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_page("biodata", 25, None)
        .await
        .expect("should parse search page");

    assert_eq!(page.hit_count, 2);
    assert_eq!(page.articles.len(), 2);
    assert_eq!(page.articles[0].id, "34664389");
    assert_eq!(
        page.articles[0].title,
        "MiRBase: a database of microRNA sequences"
    );
    assert_eq!(page.articles[1].id, "PPR400000");
    assert_eq!(page.next_cursor.as_deref(), Some("AoIIP4AAACsz"));
}

#[tokio::test]
async fn search_all_follows_cursor_until_exhausted() {
    let server = MockServer::start().await;

    let first = serde_json::json!({
        "hitCount": 3,
        "nextCursorMark": "CURSOR2",
        "resultList": { "result": [
            { "id": "1", "pmid": "1", "title": "one", "abstractText": "a" },
            { "id": "2", "pmid": "2", "title": "two", "abstractText": "b" }
        ]}
    });
    // Final page repeats the cursor it was asked for, signalling exhaustion.
    let second = serde_json::json!({
        "hitCount": 3,
        "nextCursorMark": "CURSOR2",
        "resultList": { "result": [
            { "id": "3", "pmid": "3", "title": "three", "abstractText": "c" }
        ]}
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("cursorMark", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&first))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("cursorMark", "CURSOR2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&second))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let articles = client
        .search_all("biodata", 2)
        .await
        .expect("should fetch all pages");

    let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn search_page_surfaces_http_status_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search_page("biodata", 25, None).await.unwrap_err();
    assert!(
        matches!(err, EpmcError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn search_page_surfaces_deserialize_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search_page("biodata", 25, None).await.unwrap_err();
    assert!(
        matches!(err, EpmcError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}
