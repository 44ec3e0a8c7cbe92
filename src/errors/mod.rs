//! # Error Handling
//!
//! Error types for secret lifecycle operations, defined with `thiserror`.
//!
//! Hard failures travel through [`Error`]. A version that reads back with a
//! null payload is not an error at this level; see
//! [`crate::secrets::ReadOutcome`] and [`crate::resource::Outcome`].

use std::fmt;

/// Result type for secret lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The operation a store request was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    Write,
    Read,
    Delete,
}

impl StoreAction {
    /// Lowercase tag used in messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreAction::Write => "write",
            StoreAction::Read => "read",
            StoreAction::Delete => "delete",
        }
    }

    /// Sub-path of the KV v2 API governed by this action's policy.
    pub fn policy_segment(&self) -> &'static str {
        match self {
            StoreAction::Write | StoreAction::Read => "data",
            StoreAction::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while managing a secret.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The requested version does not exist or has been soft-deleted.
    #[error("secret {path} version {version} does not exist")]
    NotFound { path: String, version: u64 },

    /// The store rejected the caller's token for this action.
    #[error(
        "403 Forbidden: you cannot {action} secret {path}; capabilities: {}",
        format_capabilities(.capabilities)
    )]
    Forbidden {
        action: StoreAction,
        path: String,
        capabilities: Option<Vec<String>>,
    },

    /// The store is sealed or under maintenance.
    #[error("503 could not {action} secret {path}: store is down for maintenance or sealed")]
    ServiceUnavailable { action: StoreAction, path: String },

    /// Any other unexpected status from the store.
    #[error("could not {action} secret {path}: {status} {reason} {body}")]
    Store {
        action: StoreAction,
        path: String,
        status: u16,
        reason: String,
        body: String,
    },

    /// The store answered with a success status but an unusable body.
    #[error("could not {action} secret {path}: malformed store response: {message}")]
    MalformedResponse {
        action: StoreAction,
        path: String,
        message: String,
    },

    /// Network-level failure below HTTP (DNS, refused connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Secret data could not be decoded.
    #[error("invalid secret data: {reason}")]
    InvalidData { reason: String },

    /// The request is missing something the operation needs.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<String>, version: u64) -> Self {
        Self::NotFound { path: path.into(), version }
    }

    /// Create an invalid data error.
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData { reason: reason.into() }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a malformed response error.
    pub fn malformed(action: StoreAction, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse { action, path: path.into(), message: message.into() }
    }

    /// Whether this is the domain-level not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn format_capabilities(capabilities: &Option<Vec<String>>) -> String {
    match capabilities {
        Some(caps) => format!("{:?}", caps),
        None => "unknown".to_string(),
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        fields.sort();

        Self::invalid_request(format!("validation failed: {}", fields.join("; ")))
    }
}
