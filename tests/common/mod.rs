//! Shared helpers for integration tests
//!
//! Provides a wiremock-backed stand-in for a Vault KV v2 mount:
//! - [`KvFake`]: stateful versioned store answering write/read/delete
//! - capability and raw-status mocks for failure paths

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use vault_secret::secrets::{SecretString, VaultKvClient};
use vault_secret::ConnectionConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TEST_TOKEN: &str = "hvs.test-token";
pub const MOUNT: &str = "secret";
pub const SECRET_PATH: &str = "app/db";

/// Connection to `server` with the test token and a short timeout.
pub fn connection(server: &MockServer) -> ConnectionConfig {
    ConnectionConfig::new(server.uri(), Some(SecretString::new(TEST_TOKEN))).with_timeout_seconds(5)
}

pub fn client(server: &MockServer) -> VaultKvClient {
    VaultKvClient::new(&connection(server), MOUNT, SECRET_PATH).unwrap()
}

pub fn data_path() -> String {
    format!("/v1/{}/data/{}", MOUNT, SECRET_PATH)
}

pub fn delete_path() -> String {
    format!("/v1/{}/delete/{}", MOUNT, SECRET_PATH)
}

pub const CAPABILITIES_PATH: &str = "/v1/sys/capabilities-self";

/// Body the store returns for a version without data.
pub fn null_data_body(version: u64) -> Value {
    json!({
        "data": {
            "data": null,
            "metadata": {"version": version, "deletion_time": "2024-01-01T00:00:00Z", "destroyed": false}
        }
    })
}

/// Mount a capability lookup answering `capabilities`, expected `times` times.
pub async fn mount_capabilities(server: &MockServer, capabilities: &[&str], times: u64) {
    Mock::given(method("POST"))
        .and(path(CAPABILITIES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "capabilities": capabilities,
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// In-memory versioned KV v2 mount. Versions start at 1 and are never
/// reused; a deleted version keeps its number and reads as null data.
#[derive(Clone, Default)]
pub struct KvFake {
    versions: Arc<Mutex<Vec<Option<Value>>>>,
}

impl KvFake {
    /// Mount write, read and delete handlers for the test secret on `server`.
    pub async fn mount(server: &MockServer) -> Self {
        let fake = Self::default();

        Mock::given(method("POST"))
            .and(path(data_path()))
            .respond_with(fake.clone())
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(data_path()))
            .respond_with(fake.clone())
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path(delete_path()))
            .respond_with(fake.clone())
            .mount(server)
            .await;

        fake
    }

    /// Number of versions ever written.
    pub fn latest_version(&self) -> u64 {
        self.versions.lock().unwrap().len() as u64
    }

    fn write(&self, body: &Value) -> ResponseTemplate {
        let Some(data) = body.get("data").filter(|d| d.is_object()) else {
            return ResponseTemplate::new(400).set_body_json(json!({"errors": ["no data provided"]}));
        };

        let mut versions = self.versions.lock().unwrap();
        versions.push(Some(data.clone()));
        let version = versions.len() as u64;

        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"version": version, "created_time": "2024-01-01T00:00:00Z", "destroyed": false}
        }))
    }

    fn read(&self, request: &Request) -> ResponseTemplate {
        let version = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "version")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        let versions = self.versions.lock().unwrap();
        match version.checked_sub(1).and_then(|i| versions.get(i)) {
            Some(Some(data)) => ResponseTemplate::new(200).set_body_json(json!({
                "data": {"data": data, "metadata": {"version": version}}
            })),
            _ => ResponseTemplate::new(404).set_body_json(null_data_body(version as u64)),
        }
    }

    fn delete(&self, body: &Value) -> ResponseTemplate {
        let mut versions = self.versions.lock().unwrap();
        for version in body["versions"].as_array().into_iter().flatten().filter_map(Value::as_u64) {
            if let Some(slot) = (version as usize).checked_sub(1).and_then(|i| versions.get_mut(i)) {
                *slot = None;
            }
        }
        ResponseTemplate::new(204)
    }
}

impl Respond for KvFake {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        match (request.method.as_str(), request.url.path()) {
            ("GET", _) => self.read(request),
            ("POST", p) if p == delete_path() => self.delete(&body),
            _ => self.write(&body),
        }
    }
}
