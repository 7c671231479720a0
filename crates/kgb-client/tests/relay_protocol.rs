//! Wire-level tests for the KGB JSON-RPC client.
//!
//! Each test runs a mock relay and checks the request the client sends, or
//! how the client interprets a particular response.

use kgb_client::{
    sign_request, Change, CommitNotification, Endpoint, KgbError, AUTH_HEADER, PROJECT_HEADER,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "example-repo-id";
const PASSWORD: &str = "example-repo-password";

async fn relay_responding(status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

// ===========================================================================
// Request construction
// ===========================================================================

#[tokio::test]
async fn relay_message_sends_signed_request() {
    let expected_body = r#"{"method":"relay_message","params":["hi, y'all!"],"id":0}"#;
    let expected_auth = sign_request(PASSWORD, PROJECT, expected_body.as_bytes());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .and(header("content-type", "application/json"))
        .and(header(PROJECT_HEADER, PROJECT))
        .and(header(AUTH_HEADER, expected_auth.as_str()))
        .and(body_string(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);
    project.relay_message("hi, y'all!").await.unwrap();
}

#[tokio::test]
async fn commit_sends_notification_as_single_param() {
    let commit = CommitNotification::new("tianon", "Add relay client")
        .with_commit_id("0123abcd")
        .with_branch("main")
        .with_module("kgb")
        .with_change(Change::added("client.rs"))
        .with_change(Change::modified("doc.rs").property_only())
        .with_web_link("https://example.com/commit/0123abcd")
        .with_color(true);

    let expected_body = format!(
        r#"{{"method":"commit_v4","params":[{}],"id":0}}"#,
        serde_json::to_string(&commit).unwrap()
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .and(body_string(expected_body.as_str()))
        .and(header(
            AUTH_HEADER,
            sign_request(PASSWORD, PROJECT, expected_body.as_bytes()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": ""})))
        .expect(1)
        .mount(&server)
        .await;

    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);
    project.commit(&commit).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["params"][0]["changes"], json!(["(A)client.rs", "(M)doc.rs+"]));
    assert_eq!(sent["params"][0]["extra"]["use_color"], json!(true));
}

#[tokio::test]
async fn trailing_slash_in_address_is_tolerated() {
    let server = relay_responding(200, json!({"result": "OK"})).await;
    let project = Endpoint::new(&format!("{}/", server.uri())).project(PROJECT, PASSWORD);
    project.relay_message("slash").await.unwrap();
}

// ===========================================================================
// Response interpretation
// ===========================================================================

#[tokio::test]
async fn relay_message_rejects_wrong_case_marker() {
    let server = relay_responding(200, json!({"result": "ok"})).await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    let err = project.relay_message("hello").await.unwrap_err();
    match err {
        KgbError::ProtocolViolation { method, result } => {
            assert_eq!(method, "relay_message");
            assert_eq!(result, json!("ok"));
        }
        other => panic!("expected ProtocolViolation, got {:?}", other),
    }
}

#[tokio::test]
async fn relay_message_rejects_non_string_result() {
    let server = relay_responding(200, json!({"result": {"status": "OK"}})).await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    let err = project.relay_message("hello").await.unwrap_err();
    assert!(matches!(err, KgbError::ProtocolViolation { .. }));
}

#[tokio::test]
async fn commit_accepts_ok_marker() {
    let server = relay_responding(200, json!({"result": "OK"})).await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    project
        .commit(&CommitNotification::new("a", "b"))
        .await
        .unwrap();
}

#[tokio::test]
async fn commit_rejects_missing_result() {
    let server = relay_responding(200, json!({"id": 0})).await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    let err = project
        .commit(&CommitNotification::new("a", "b"))
        .await
        .unwrap_err();
    match err {
        KgbError::ProtocolViolation { method, result } => {
            assert_eq!(method, "commit_v4");
            assert_eq!(result, Value::Null);
        }
        other => panic!("expected ProtocolViolation, got {:?}", other),
    }
}

#[tokio::test]
async fn http_500_is_transport_error_regardless_of_body() {
    let server = relay_responding(500, json!({"result": "OK"})).await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    let err = project.relay_message("hello").await.unwrap_err();
    match err {
        KgbError::Transport(status) => assert!(status.contains("500"), "status was {}", status),
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn session_recovers_after_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("relay is restarting, try again later"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);
    let err = project.relay_message("first").await.unwrap_err();
    assert!(matches!(err, KgbError::Transport(_)));

    project.relay_message("second").await.unwrap();
}

#[tokio::test]
async fn error_member_is_remote_error() {
    let server = relay_responding(200, json!({"error": "bad project id"})).await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    let err = project.relay_message("hello").await.unwrap_err();
    match err {
        KgbError::Remote(value) => assert_eq!(value, json!("bad project id")),
        other => panic!("expected Remote, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;
    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);

    let err = project.relay_message("hello").await.unwrap_err();
    assert!(matches!(err, KgbError::Decode(_)));
}

#[tokio::test]
async fn unreachable_relay_is_transport_error() {
    // Nothing listens on port 1
    let project = Endpoint::new("http://127.0.0.1:1").project(PROJECT, PASSWORD);

    let err = project.relay_message("hello").await.unwrap_err();
    assert!(matches!(err, KgbError::Transport(_)));
}

// ===========================================================================
// Sharing
// ===========================================================================

#[tokio::test]
async fn session_is_reusable_across_concurrent_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
        .expect(4)
        .mount(&server)
        .await;

    let project = Endpoint::new(&server.uri()).project(PROJECT, PASSWORD);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let project = project.clone();
            tokio::spawn(async move { project.relay_message(&format!("message {}", i)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}
