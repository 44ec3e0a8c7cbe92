//! End-to-end lifecycle tests: framework request → dispatch → mock KV v2 store.

mod common;

use common::*;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use tracing_test::traced_test;
use vault_secret::handler::{HandlerErrorCode, HandlerRequest, ProgressEvent};
use vault_secret::secrets::generator::is_url_safe;
use vault_secret::secrets::SecretData;
use vault_secret::{dispatch, ConnectionConfig, Outcome, ResourceLifecycle, SecretLifecycle, SecretSpec};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn handle(server: &MockServer, request: Value) -> ProgressEvent {
    let request: HandlerRequest = serde_json::from_value(request).unwrap();
    dispatch(&SecretLifecycle::new(), request, &connection(server)).await
}

fn model_data(event: &ProgressEvent) -> SecretData {
    event.resource_model.as_ref().unwrap().secret_data.as_ref().unwrap().decode().unwrap()
}

#[tokio::test]
async fn create_without_data_generates_default_length_value() {
    let server = MockServer::start().await;
    let fake = KvFake::mount(&server).await;

    let event = handle(
        &server,
        json!({
            "action": "CREATE",
            "desiredResourceState": {"SecretPath": SECRET_PATH, "SecretLength": 0}
        }),
    )
    .await;

    assert!(event.is_success(), "unexpected failure: {:?}", event.message);
    let model = event.resource_model.as_ref().unwrap();
    assert_eq!(model.version, Some(1));
    assert_eq!(model.secret_length, Some(32));

    // The write payload is exactly {"data": {"value": <token>}}.
    let requests = server.received_requests().await.unwrap();
    let write = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    let body: Value = serde_json::from_slice(&write.body).unwrap();
    let written = body["data"]["value"].as_str().unwrap();
    assert_eq!(body["data"].as_object().unwrap().len(), 1);
    assert_eq!(written.len(), 32);
    assert!(is_url_safe(written));

    // The reported data comes from the read-back and matches what was written.
    assert_eq!(model_data(&event)["value"], written);
    assert_eq!(fake.latest_version(), 1);
}

#[tokio::test]
async fn create_with_legacy_data_round_trips() {
    let server = MockServer::start().await;
    KvFake::mount(&server).await;

    let event = handle(
        &server,
        json!({
            "action": "CREATE",
            "desiredResourceState": {
                "SecretPath": SECRET_PATH,
                "SecretData": "'username=admin', 'password=hunter2'"
            }
        }),
    )
    .await;

    assert!(event.is_success());
    let data = model_data(&event);
    assert_eq!(data["username"], "admin");
    assert_eq!(data["password"], "hunter2");

    // Responses carry the structured map, never the legacy string.
    let json = serde_json::to_value(&event).unwrap();
    assert!(json["resourceModel"]["SecretData"].is_object());
    assert!(json["resourceModel"].get("Token").is_none());
}

#[tokio::test]
async fn read_existing_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"data": {"value": "abc"}, "metadata": {"version": 1}}
        })))
        .mount(&server)
        .await;

    let event = handle(
        &server,
        json!({"action": "READ", "desiredResourceState": {"SecretPath": SECRET_PATH, "Version": 1}}),
    )
    .await;

    assert!(event.is_success());
    let data = model_data(&event);
    assert_eq!(data.len(), 1);
    assert_eq!(data["value"], "abc");
    assert_eq!(event.resource_model.unwrap().version, Some(1));
}

#[tokio::test]
async fn delete_missing_version_never_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(data_path()))
        .respond_with(ResponseTemplate::new(404).set_body_json(null_data_body(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(delete_path()))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let event = handle(
        &server,
        json!({"action": "DELETE", "desiredResourceState": {"SecretPath": SECRET_PATH, "Version": 1}}),
    )
    .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
    assert_eq!(
        event.message.as_deref(),
        Some("secret app/db version 1 does not exist so it can't be deleted")
    );
}

#[tokio::test]
async fn create_forbidden_reports_capabilities() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(data_path()))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_capabilities(&server, &["read"], 1).await;

    let event = handle(
        &server,
        json!({
            "action": "CREATE",
            "desiredResourceState": {"SecretPath": SECRET_PATH, "SecretData": {"value": "abc"}}
        }),
    )
    .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::AccessDenied));
    let message = event.message.unwrap();
    assert!(message.contains("you cannot write secret app/db"));
    assert!(message.contains(r#"capabilities: ["read"]"#));
}

#[tokio::test]
async fn read_service_unavailable_skips_capabilities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(data_path()))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_capabilities(&server, &["read"], 0).await;

    let event = handle(
        &server,
        json!({"action": "READ", "desiredResourceState": {"SecretPath": SECRET_PATH, "Version": 1}}),
    )
    .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::ServiceInternalError));
    assert!(event.message.unwrap().contains("read failed for secret app/db"));
}

#[tokio::test]
async fn version_zero_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    // The store answers version 0 with the latest version's data.
    Mock::given(method("GET"))
        .and(path(data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"data": {"value": "latest"}, "metadata": {"version": 3}}
        })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(delete_path()))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    for action in ["READ", "DELETE"] {
        let event = handle(
            &server,
            json!({"action": action, "desiredResourceState": {"SecretPath": SECRET_PATH, "Version": 0}}),
        )
        .await;

        assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest), "{}", action);
        assert!(event.resource_model.is_none());
        assert!(event.message.unwrap().contains("version 0"));
    }
}

#[tokio::test]
async fn oversized_secret_length_fails_without_writing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(data_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"version": 1}})))
        .expect(0)
        .mount(&server)
        .await;

    let event = handle(
        &server,
        json!({
            "action": "CREATE",
            "desiredResourceState": {"SecretPath": SECRET_PATH, "SecretLength": u64::MAX}
        }),
    )
    .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
    assert!(event.message.unwrap().contains("exceeds the maximum"));
}

#[tokio::test]
async fn delete_then_read_reports_not_found() {
    let server = MockServer::start().await;
    KvFake::mount(&server).await;
    let lifecycle = SecretLifecycle::new();
    let connection = connection(&server);

    let mut data = SecretData::new();
    data.insert("value".to_string(), "abc".to_string());
    let created = lifecycle
        .create(SecretSpec::new(SECRET_PATH).with_data(data), &connection)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let version = created.version.unwrap();

    let deleted = lifecycle
        .delete(SecretSpec::new(SECRET_PATH).with_version(version), &connection)
        .await
        .unwrap();
    assert_eq!(deleted, Outcome::Done(()));

    let read = lifecycle
        .read(SecretSpec::new(SECRET_PATH).with_version(version), &connection)
        .await
        .unwrap();
    assert_eq!(read, Outcome::NotFound { path: SECRET_PATH.to_string(), version });

    // Deleting again is refused without touching the store's delete endpoint.
    let again = lifecycle
        .delete(SecretSpec::new(SECRET_PATH).with_version(version), &connection)
        .await
        .unwrap();
    assert!(again.is_not_found());
}

#[tokio::test]
async fn repeated_creates_get_increasing_versions() {
    let server = MockServer::start().await;
    KvFake::mount(&server).await;
    let lifecycle = SecretLifecycle::new();
    let connection = connection(&server);

    let mut previous = 0;
    for _ in 0..4 {
        let spec = SecretSpec::new(SECRET_PATH).with_secret_length(NonZeroUsize::new(12));
        let created =
            lifecycle.create(spec, &connection).await.unwrap().into_result().unwrap();
        let version = created.version.unwrap();
        assert!(version > previous);
        assert_eq!(created.data["value"].len(), 12);
        previous = version;
    }
}

#[tokio::test]
async fn type_configuration_server_wins_over_model_server() {
    let server = MockServer::start().await;
    KvFake::mount(&server).await;

    let request: HandlerRequest = serde_json::from_value(json!({
        "action": "CREATE",
        "desiredResourceState": {
            "SecretPath": SECRET_PATH,
            "Server": "http://127.0.0.1:1",
            "SecretData": {"value": "abc"}
        },
        "typeConfiguration": {
            "VaultConnection": {"Server": server.uri(), "Token": TEST_TOKEN}
        }
    }))
    .unwrap();

    let event = dispatch(&SecretLifecycle::new(), request, &ConnectionConfig::default()).await;
    assert!(event.is_success(), "unexpected failure: {:?}", event.message);
}

#[tokio::test]
async fn model_server_used_when_connection_has_none() {
    let server = MockServer::start().await;
    KvFake::mount(&server).await;

    let request: HandlerRequest = serde_json::from_value(json!({
        "action": "CREATE",
        "desiredResourceState": {
            "SecretPath": SECRET_PATH,
            "Server": server.uri(),
            "Token": TEST_TOKEN,
            "SecretData": {"value": "abc"}
        }
    }))
    .unwrap();

    let event = dispatch(&SecretLifecycle::new(), request, &ConnectionConfig::default()).await;
    assert!(event.is_success(), "unexpected failure: {:?}", event.message);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.headers.get("x-vault-token").unwrap() == TEST_TOKEN));
}

#[tokio::test]
async fn missing_server_is_invalid_request() {
    let event = dispatch(
        &SecretLifecycle::new(),
        serde_json::from_value(json!({
            "action": "READ",
            "desiredResourceState": {"SecretPath": SECRET_PATH, "Version": 1}
        }))
        .unwrap(),
        &ConnectionConfig::default(),
    )
    .await;

    assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
}

#[traced_test]
#[tokio::test]
async fn logs_never_contain_token_or_secret_values() {
    let server = MockServer::start().await;
    KvFake::mount(&server).await;

    let event = handle(
        &server,
        json!({
            "action": "CREATE",
            "desiredResourceState": {
                "SecretPath": SECRET_PATH,
                "SecretData": {"password": "hunter2-do-not-log"}
            }
        }),
    )
    .await;
    assert!(event.is_success());

    assert!(logs_contain("Wrote secret"));
    assert!(logs_contain("password"));
    assert!(!logs_contain("hunter2-do-not-log"));
    assert!(!logs_contain(TEST_TOKEN));
}
