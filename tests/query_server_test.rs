//! Server-Context Query Tests
//!
//! The request-scoped read variant takes its credential per call and never
//! fails: every outcome lands in the result envelope.

use postdesk::{ClientError, ClientRegistry, QueryRequest, RegistryConfig};
use serde_json::{Value, json};
use tracing_test::traced_test;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn single_origin_fixture() -> (ClientRegistry, MockServer) {
    let server = MockServer::start().await;
    let registry = ClientRegistry::new(RegistryConfig::new(
        server.uri(),
        server.uri(),
        server.uri(),
    ))
    .expect("registry");
    (registry, server)
}

#[tokio::test]
async fn explicit_token_is_carried_without_ambient_state() {
    let (registry, server) = single_origin_fixture().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer cookie-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.c"})))
        .expect(1)
        .mount(&server)
        .await;

    // No set_credential call has happened; the token travels per call.
    let response = registry
        .query_server::<Value>(QueryRequest::new("/api/v1/me"), Some("cookie-tok"))
        .await;
    assert!(!response.is_error);
    assert_eq!(response.data, Some(json!({"email": "a@b.c"})));
    assert!(response.error.is_none());
}

#[tokio::test]
async fn absent_token_sends_no_authorization_header() {
    let (registry, server) = single_origin_fixture().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let response = registry
        .query_server::<Value>(QueryRequest::new("/api/v1/public"), None)
        .await;
    assert!(!response.is_error);
    assert_eq!(response.data, Some(json!({"ok": true})));

    let requests = server.received_requests().await.expect("received requests");
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn backend_failures_land_in_the_envelope() {
    let (registry, server) = single_origin_fixture().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
        .mount(&server)
        .await;

    let response = registry
        .query_server::<Value>(QueryRequest::new("/api/v1/me"), Some("tok"))
        .await;
    assert!(response.is_error);
    assert!(response.data.is_none());
    match response.error {
        Some(ClientError::Api { status, detail, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "not found");
        }
        other => panic!("unexpected envelope error: {other:?}"),
    }
}

#[traced_test]
#[tokio::test]
async fn a_simulated_network_failure_never_breaks_the_caller() {
    let registry = ClientRegistry::new(RegistryConfig::new(
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
    ))
    .expect("registry");

    let response = registry
        .query_server::<Value>(QueryRequest::new("/api/v1/me"), Some("tok"))
        .await;
    assert!(response.is_error);
    assert!(response.data.is_none());
    assert!(matches!(response.error, Some(ClientError::Http(_))));
    assert!(logs_contain("server-context query failed"));
}
