//! HashiCorp Vault KV v2 client over the raw HTTP API.
//!
//! The client is bound to one secret (`server`, `mount_path`, `path`) and
//! one token for its whole life, and is built fresh for every invocation.
//! It is the only place where HTTP status codes are interpreted.
//!
//! | Operation    | Request                                              |
//! |--------------|------------------------------------------------------|
//! | write        | `POST {server}/v1/{mount}/data/{path}`               |
//! | read         | `GET  {server}/v1/{mount}/data/{path}?version={n}`   |
//! | delete       | `POST {server}/v1/{mount}/delete/{path}`             |
//! | capabilities | `POST {server}/v1/sys/capabilities-self`             |
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_secret::config::ConnectionConfig;
//! use vault_secret::secrets::{SecretStore, VaultKvClient};
//!
//! let connection = ConnectionConfig::new("https://vault.example.com", Some(token));
//! let client = VaultKvClient::new(&connection, "secret", "app/db")?;
//! let version = client.write_secret(&data).await?;
//! let outcome = client.read_secret_version(version).await?;
//! ```
//!
//! # Security
//!
//! - The token header is marked sensitive and is never logged
//! - Secret values are never logged; only keys, versions and statuses are
//! - Error bodies are kept verbatim for diagnosis

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::errors::{Error, Result, StoreAction};

use super::client::{ReadOutcome, SecretStore};
use super::types::{data_keys, SecretData, SecretString};

/// Header carrying the store token.
pub const TOKEN_HEADER: &str = "x-vault-token";

/// Header sent instead of the token when none is configured. Some transports
/// refuse requests that carry no header at all.
pub const NO_TOKEN_HEADER: &str = "x-no-token";
pub const NO_TOKEN_VALUE: &str = "NoToken";

/// Build the single authentication header for every request.
pub fn auth_headers(token: Option<&SecretString>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    match token.filter(|t| !t.is_empty()) {
        Some(token) => {
            let mut value = HeaderValue::from_str(token.expose_secret()).map_err(|_| {
                Error::config("token contains characters not allowed in an HTTP header")
            })?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(TOKEN_HEADER), value);
        }
        None => {
            warn!("No authentication token was given, sending placeholder header");
            headers.insert(
                HeaderName::from_static(NO_TOKEN_HEADER),
                HeaderValue::from_static(NO_TOKEN_VALUE),
            );
        }
    }

    Ok(headers)
}

/// Strip leading and trailing slashes from a server or mount value.
pub fn normalize(segment: &str) -> String {
    segment.trim_matches('/').to_string()
}

/// Turn a failed store response into an error.
///
/// A 403 triggers exactly one capability lookup on `store`; a failed lookup
/// leaves the capabilities unknown rather than masking the 403. A 503 is
/// reported without any lookup.
pub async fn interpret_failure<S>(
    store: &S,
    action: StoreAction,
    status: StatusCode,
    body: String,
) -> Error
where
    S: SecretStore + ?Sized,
{
    let path = store.path().to_string();

    match status {
        StatusCode::FORBIDDEN => {
            let capabilities = match store.check_capabilities(action).await {
                Ok(capabilities) => Some(capabilities),
                Err(e) => {
                    warn!(error = %e, path = %path, action = %action, "Capability lookup failed");
                    None
                }
            };
            Error::Forbidden { action, path, capabilities }
        }
        StatusCode::SERVICE_UNAVAILABLE => Error::ServiceUnavailable { action, path },
        _ => Error::Store {
            action,
            path,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        },
    }
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    data: &'a SecretData,
}

#[derive(Serialize)]
struct DeleteRequest {
    versions: [u64; 1],
}

#[derive(Serialize)]
struct CapabilitiesRequest {
    paths: String,
}

#[derive(Deserialize)]
struct CapabilitiesResponse {
    capabilities: Vec<String>,
}

/// Vault KV v2 client bound to one secret.
///
/// Holds no state beyond its binding; nothing is cached between calls.
pub struct VaultKvClient {
    http: Client,
    server: String,
    mount_path: String,
    path: String,
}

impl VaultKvClient {
    /// Build a client for `mount_path`/`path` on the connection's server.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the token is not a valid header value or the
    ///   HTTP client cannot be built
    pub fn new(connection: &ConnectionConfig, mount_path: &str, path: &str) -> Result<Self> {
        let server = normalize(&connection.server);
        if server.is_empty() {
            return Err(Error::config("store server address cannot be empty"));
        }

        let http = Client::builder()
            .default_headers(auth_headers(connection.token.as_ref())?)
            .timeout(connection.timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, server, mount_path: normalize(mount_path), path: path.to_string() })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    fn api_url(&self, segment: &str) -> String {
        format!("{}/v1/{}/{}/{}", self.server, self.mount_path, segment, self.path)
    }

    async fn read_body(&self, action: StoreAction, response: Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let body = response.text().await?;
        debug!(path = %self.path, action = %action, status = status.as_u16(), "Store responded");
        Ok((status, body))
    }
}

fn is_success(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::NO_CONTENT
}

fn parse_body(action: StoreAction, path: &str, body: &str) -> Result<Option<Value>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| Error::malformed(action, path, format!("invalid JSON body: {}", e)))
}

/// `true` when the body is a JSON object whose `data.data` is explicitly null.
fn has_null_data(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/data/data").map(Value::is_null))
        .unwrap_or(false)
}

fn into_secret_data(path: &str, object: serde_json::Map<String, Value>) -> Result<SecretData> {
    let mut data = SecretData::new();
    for (key, value) in object {
        let value = match value {
            Value::String(s) => s,
            Value::Null => {
                return Err(Error::malformed(
                    StoreAction::Read,
                    path,
                    format!("key '{}' has a null value", key),
                ))
            }
            other => other.to_string(),
        };
        data.insert(key, value);
    }
    Ok(data)
}

#[async_trait]
impl SecretStore for VaultKvClient {
    fn path(&self) -> &str {
        &self.path
    }

    async fn write_secret(&self, data: &SecretData) -> Result<u64> {
        let action = StoreAction::Write;
        let url = self.api_url("data");

        info!(url = %url, keys = ?data_keys(data), "Writing secret");

        let response = self.http.post(&url).json(&WriteRequest { data }).send().await?;
        let (status, body) = self.read_body(action, response).await?;

        if !is_success(status) {
            return Err(interpret_failure(self, action, status, body).await);
        }

        let version = parse_body(action, &self.path, &body)?
            .and_then(|v| v.pointer("/data/version").and_then(Value::as_u64))
            .ok_or_else(|| Error::malformed(action, &self.path, "response has no data.version"))?;

        info!(path = %self.path, version, status = status.as_u16(), "Wrote secret");
        Ok(version)
    }

    async fn read_secret_version(&self, version: u64) -> Result<ReadOutcome> {
        let action = StoreAction::Read;
        let url = format!("{}?version={}", self.api_url("data"), version);

        info!(url = %url, version, "Reading secret version");

        let response = self.http.get(&url).send().await?;
        let (status, body) = self.read_body(action, response).await?;

        if status == StatusCode::NOT_FOUND && has_null_data(&body) {
            info!(path = %self.path, version, "Secret version has no data");
            return Ok(ReadOutcome::Missing);
        }
        if !is_success(status) {
            return Err(interpret_failure(self, action, status, body).await);
        }

        let payload = parse_body(action, &self.path, &body)?;
        let outcome = match payload.as_ref().and_then(|v| v.pointer("/data/data")) {
            None | Some(Value::Null) => ReadOutcome::Missing,
            Some(Value::Object(object)) => {
                ReadOutcome::Found(into_secret_data(&self.path, object.clone())?)
            }
            Some(_) => {
                return Err(Error::malformed(action, &self.path, "data.data is not an object"))
            }
        };

        info!(
            path = %self.path,
            version,
            status = status.as_u16(),
            found = outcome.is_found(),
            "Read secret"
        );
        Ok(outcome)
    }

    async fn delete_secret_version(&self, version: u64) -> Result<()> {
        let action = StoreAction::Delete;
        let url = self.api_url("delete");

        info!(url = %url, version, "Deleting secret version");

        let response =
            self.http.post(&url).json(&DeleteRequest { versions: [version] }).send().await?;
        let (status, body) = self.read_body(action, response).await?;

        if !is_success(status) {
            return Err(interpret_failure(self, action, status, body).await);
        }

        info!(path = %self.path, version, status = status.as_u16(), "Deleted secret version");
        Ok(())
    }

    async fn check_capabilities(&self, action: StoreAction) -> Result<Vec<String>> {
        let url = format!("{}/v1/sys/capabilities-self", self.server);
        let request = CapabilitiesRequest {
            paths: format!("{}/{}/{}", self.mount_path, action.policy_segment(), self.path),
        };

        info!(path = %request.paths, action = %action, "Checking token capabilities");

        let response = self.http.post(&url).json(&request).send().await?;
        let (status, body) = self.read_body(action, response).await?;

        if !status.is_success() {
            return Err(Error::Store {
                action,
                path: self.path.clone(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let parsed: CapabilitiesResponse = serde_json::from_str(&body).map_err(|e| {
            Error::malformed(action, &self.path, format!("invalid capabilities response: {}", e))
        })?;
        Ok(parsed.capabilities)
    }
}
