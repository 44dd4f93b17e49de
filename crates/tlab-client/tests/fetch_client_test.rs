//! Contract tests for the authenticated fetch client against a wiremock
//! backend.
//!
//! | Behaviour                          | Test                                   |
//! |------------------------------------|----------------------------------------|
//! | Bearer injection while live        | `live_session_sends_bearer`            |
//! | No header once expired             | `expired_session_sends_no_header`      |
//! | 401 clears session and redirects   | `unauthorized_clears_and_redirects`    |
//! | 204 yields empty payload           | `no_content_is_empty`                  |
//! | Error message extraction           | `error_message_*`                      |
//! | Caller headers are kept            | `caller_content_type_is_kept`          |

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tlab_client::clock::ManualClock;
use tlab_client::navigator::RecordingNavigator;
use tlab_client::storage::MemoryStorage;
use tlab_client::{ApiConfig, ApiError, FetchClient, Payload, SessionStore, LOGIN_PAGE};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    client: FetchClient,
    session: SessionStore,
    clock: Arc<ManualClock>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(server: &MockServer) -> Harness {
    let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let session = SessionStore::new(Arc::new(MemoryStorage::new()), clock.clone());
    let navigator = Arc::new(RecordingNavigator::new());
    let config = ApiConfig::with_base_url(&server.uri()).unwrap();
    let client = FetchClient::new(config, session.clone(), navigator.clone()).unwrap();
    Harness {
        client,
        session,
        clock,
        navigator,
    }
}

fn status_of(err: ApiError) -> (Option<u16>, String) {
    (err.status_code(), err.message())
}

// -- Bearer injection ---------------------------------------------------------

#[tokio::test]
async fn live_session_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workshops"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.persist("t1", 3600, None);

    let payload = h.client.get("workshops").await.unwrap();
    assert_eq!(payload, Payload::Json(serde_json::json!([])));
}

#[tokio::test]
async fn expired_session_sends_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workshops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.persist("t1", 3600, None);
    h.clock.advance(Duration::seconds(3600));

    h.client.get("workshops").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn anonymous_request_sends_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/venues"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let h = harness(&server);
    assert_eq!(h.client.get("venues").await.unwrap(), Payload::Empty);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

// -- 401 handling -------------------------------------------------------------

#[tokio::test]
async fn unauthorized_clears_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.persist("t1", 3600, None);

    let err = h.client.get("users/me").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.status_code(), Some(401));
    assert!(!h.session.is_live());
    assert!(h.session.session().is_none());
    assert_eq!(h.navigator.targets(), vec![LOGIN_PAGE.to_string()]);
}

// -- Body normalization -------------------------------------------------------

#[tokio::test]
async fn no_content_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/workshops/7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let h = harness(&server);
    let payload = h.client.send_empty(Method::DELETE, "workshops/7").await.unwrap();
    assert!(payload.is_empty());
}

#[tokio::test]
async fn error_message_from_json_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/workshops"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "X"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h
        .client
        .send_json::<_, serde_json::Value>(Method::POST, "workshops", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(status_of(err), (Some(400), "X".to_string()));
}

#[tokio::test]
async fn error_message_empty_body_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/performances"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.client.get("performances").await.unwrap_err();
    assert_eq!(status_of(err), (Some(503), "HTTP 503".to_string()));
}

#[tokio::test]
async fn error_message_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal failure"))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h.client.get("groups").await.unwrap_err();
    assert_eq!(status_of(err), (Some(500), "Internal failure".to_string()));
}

#[tokio::test]
async fn forbidden_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/stats/count"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": "Forbidden"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session.persist("t1", 3600, None);

    let err = h.client.get("users/stats/count").await.unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.message(), "Forbidden");
    assert!(h.session.is_live());
    assert!(h.navigator.targets().is_empty());
}

#[tokio::test]
async fn text_success_body_is_degraded() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/users/me/password"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Password changed"))
        .mount(&server)
        .await;

    let h = harness(&server);
    let payload = h
        .client
        .request(Method::PUT, "users/me/password", HeaderMap::new(), Some("{}".into()))
        .await
        .unwrap();
    assert_eq!(payload, Payload::Text("Password changed".into()));
}

// -- Headers ------------------------------------------------------------------

#[tokio::test]
async fn json_body_gets_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/feedbacks"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"subject": "Hi"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let _: Option<serde_json::Value> = h
        .client
        .send_json(Method::POST, "feedbacks", &serde_json::json!({"subject": "Hi"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn caller_content_type_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/feedbacks"))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    h.client
        .request(Method::POST, "feedbacks", headers, Some("hello".into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn network_failure_is_not_a_status_error() {
    let config = ApiConfig::with_base_url("http://127.0.0.1:1/api/v1").unwrap();
    let client = FetchClient::new(
        config,
        SessionStore::in_memory(),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();

    let err = client.get("workshops").await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
    assert_eq!(err.status_code(), None);
}
