//! # Configuration Settings
//!
//! Connection and observability settings for the secret handler.

use crate::errors::{Error, Result};
use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Environment variable holding the store address.
pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";
/// Environment variable holding the store token.
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const ENV_VAULT_CLIENT_TIMEOUT: &str = "VAULT_CLIENT_TIMEOUT";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Connection to the secret store, supplied per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConnectionConfig {
    /// Base URL of the store (e.g. "https://vault.example.com:8200").
    /// Empty means "use the server named by the resource itself".
    pub server: String,

    /// Token sent as `X-Vault-Token`.
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Request timeout in seconds, enforced by the HTTP client.
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { server: String::new(), token: None, timeout_seconds: DEFAULT_TIMEOUT_SECONDS }
    }
}

impl ConnectionConfig {
    pub fn new(server: impl Into<String>, token: Option<SecretString>) -> Self {
        Self { server: server.into(), token, ..Default::default() }
    }

    /// Load from `VAULT_ADDR`, `VAULT_TOKEN` and `VAULT_CLIENT_TIMEOUT`.
    ///
    /// Every variable is optional; a set but unparsable timeout is an error.
    pub fn from_env() -> Result<Self> {
        let server = std::env::var(ENV_VAULT_ADDR).unwrap_or_default();
        let token = std::env::var(ENV_VAULT_TOKEN).ok().filter(|t| !t.is_empty()).map(SecretString::new);
        let timeout_seconds = match std::env::var(ENV_VAULT_CLIENT_TIMEOUT) {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        Ok(Self { server, token, timeout_seconds })
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Fill an empty server or a missing token from the resource's own fields,
    /// then validate. The connection's values take precedence.
    pub fn resolve(&self, server: &str, token: Option<&SecretString>) -> Result<Self> {
        let resolved = Self {
            server: if self.server.trim().is_empty() {
                server.to_string()
            } else {
                self.server.clone()
            },
            token: self.token.clone().or_else(|| token.cloned()),
            timeout_seconds: self.timeout_seconds,
        };

        Validate::validate(&resolved)?;
        if resolved.server.trim().is_empty() {
            return Err(Error::invalid_request("no store server configured"));
        }

        Ok(resolved)
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    raw.trim().trim_end_matches('s').parse::<u64>().map_err(|e| {
        Error::config(format!("invalid {} '{}': {}", ENV_VAULT_CLIENT_TIMEOUT, raw, e))
    })
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl ObservabilityConfig {
    /// Load from `VAULT_SECRET_LOG_LEVEL` and `VAULT_SECRET_LOG_JSON`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("VAULT_SECRET_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging: std::env::var("VAULT_SECRET_LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.json_logging),
        }
    }
}
