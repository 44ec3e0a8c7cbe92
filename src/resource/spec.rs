//! Desired and observed state of one managed secret.

use std::num::NonZeroUsize;
use validator::Validate;

use crate::secrets::vault::normalize;
use crate::secrets::{SecretData, SecretString};

/// Mount used when a resource does not name one.
pub const DEFAULT_MOUNT_PATH: &str = "secret";

/// One secret as the lifecycle sees it.
///
/// Built fresh for every invocation and never persisted locally. `version`
/// is only ever filled in from a store response.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct SecretSpec {
    /// Slash-separated location of the secret inside the mount.
    #[validate(length(min = 1, message = "Secret path cannot be empty"))]
    pub path: String,

    /// KV v2 mount, without leading or trailing slashes.
    #[validate(length(min = 1, message = "Mount path cannot be empty"))]
    pub mount_path: String,

    /// Base URL of the store, without a trailing slash. May be empty when the
    /// connection supplies the server.
    pub server: String,

    /// Token carried by the resource itself, used when the connection has none.
    pub token: Option<SecretString>,

    /// Secret payload.
    pub data: SecretData,

    /// Length of a generated secret; `None` means the default.
    pub secret_length: Option<NonZeroUsize>,

    /// Store-assigned version.
    pub version: Option<u64>,
}

impl SecretSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            server: String::new(),
            token: None,
            data: SecretData::new(),
            secret_length: None,
            version: None,
        }
    }

    pub fn with_mount_path(mut self, mount_path: &str) -> Self {
        self.mount_path = normalize(mount_path);
        self
    }

    pub fn with_server(mut self, server: &str) -> Self {
        self.server = normalize(server);
        self
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_data(mut self, data: SecretData) -> Self {
        self.data = data;
        self
    }

    pub fn with_secret_length(mut self, secret_length: Option<NonZeroUsize>) -> Self {
        self.secret_length = secret_length;
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }
}
