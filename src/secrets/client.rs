//! Store client trait and its result types.

use async_trait::async_trait;

use crate::errors::{Result, StoreAction};

use super::types::SecretData;

/// Result of reading one version of a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The version exists and carries data.
    Found(SecretData),

    /// The store answered with a null payload for this version.
    ///
    /// Covers both a soft-deleted version and one that never existed; the
    /// store response does not tell them apart.
    Missing,
}

impl ReadOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ReadOutcome::Found(_))
    }

    pub fn into_data(self) -> Option<SecretData> {
        match self {
            ReadOutcome::Found(data) => Some(data),
            ReadOutcome::Missing => None,
        }
    }
}

/// Versioned key/value secret store bound to one secret path.
///
/// Each call issues its request and interprets the status. Non-success
/// statuses become [`crate::Error`] values; a 403 is enriched with the
/// caller's capabilities before it is returned.
///
/// # Security
///
/// Implementations MUST NOT log secret values or tokens.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Logical path of the secret this client is bound to.
    fn path(&self) -> &str;

    /// Write `data` as a new version and return the version the store assigned.
    async fn write_secret(&self, data: &SecretData) -> Result<u64>;

    /// Read a specific version.
    async fn read_secret_version(&self, version: u64) -> Result<ReadOutcome>;

    /// Soft-delete a specific version. The version number stays allocated.
    async fn delete_secret_version(&self, version: u64) -> Result<()>;

    /// Capabilities the caller holds on the path governing `action`.
    ///
    /// Diagnostic only; used to explain a 403.
    async fn check_capabilities(&self, action: StoreAction) -> Result<Vec<String>>;
}
