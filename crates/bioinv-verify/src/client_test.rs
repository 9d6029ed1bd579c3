use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn checker(num_tries: u32) -> UrlChecker {
    UrlChecker::new(5, "bioinv/0.1 (test)", num_tries, 0.0).expect("checker should build")
}

#[tokio::test]
async fn ok_response_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = checker(3).check(&server.uri()).await;
    assert_eq!(outcome, CheckOutcome::Success(200));
}

#[tokio::test]
async fn redirect_status_is_recorded_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "https://example.com/"))
        .mount(&server)
        .await;

    let outcome = checker(3).check(&server.uri()).await;
    assert_eq!(outcome, CheckOutcome::Success(301));
}

#[tokio::test]
async fn not_found_is_client_failure_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = checker(3).check(&server.uri()).await;
    assert_eq!(outcome, CheckOutcome::ClientFailure(404));
}

#[tokio::test]
async fn server_error_is_client_failure_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = checker(3).check(&server.uri()).await;
    assert_eq!(outcome, CheckOutcome::ClientFailure(503));
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    // Reserved port 1 on localhost refuses connections.
    let outcome = checker(2).check("http://127.0.0.1:1/").await;
    assert!(
        matches!(outcome, CheckOutcome::NetworkError(_)),
        "got: {outcome:?}"
    );
}

#[tokio::test]
async fn unparsable_url_is_network_error() {
    let outcome = checker(3).check("adflkbndijfbn").await;
    match outcome {
        CheckOutcome::NetworkError(message) => {
            assert!(
                message.contains("invalid URL 'adflkbndijfbn'"),
                "got: {message}"
            );
        }
        other => panic!("expected NetworkError, got: {other:?}"),
    }
}
