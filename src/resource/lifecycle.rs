//! Create, read and delete of one secret against the store.
//!
//! Each operation is a single round of requests with no suspended state.
//! [`SecretLifecycle`] builds a fresh [`VaultKvClient`] per call from the
//! supplied connection; the store-generic functions ([`create_secret`],
//! [`read_secret`], [`delete_secret`]) hold the sequencing.

use async_trait::async_trait;
use std::num::NonZeroUsize;
use tracing::{info, Instrument};
use validator::Validate;

use crate::config::ConnectionConfig;
use crate::errors::{Error, Result};
use crate::invocation_span;
use crate::secrets::{encoder, generator, ReadOutcome, SecretStore, VaultKvClient};

use super::spec::SecretSpec;

/// Result of a lifecycle operation that did not hard-fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation completed.
    Done(T),

    /// The version does not exist or has been soft-deleted.
    NotFound { path: String, version: u64 },
}

impl<T> Outcome<T> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound { .. })
    }

    /// Fold `NotFound` into [`Error::NotFound`].
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Done(value) => Ok(value),
            Outcome::NotFound { path, version } => Err(Error::not_found(path, version)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::NotFound { path, version } => Outcome::NotFound { path, version },
        }
    }
}

/// The three operations a resource framework may invoke.
#[async_trait]
pub trait ResourceLifecycle: Send + Sync {
    /// Write the desired secret as a new version and return what the store holds.
    async fn create(
        &self,
        spec: SecretSpec,
        connection: &ConnectionConfig,
    ) -> Result<Outcome<SecretSpec>>;

    /// Materialize `spec.version` from the store.
    async fn read(
        &self,
        spec: SecretSpec,
        connection: &ConnectionConfig,
    ) -> Result<Outcome<SecretSpec>>;

    /// Soft-delete `spec.version` after checking that it still exists.
    async fn delete(&self, spec: SecretSpec, connection: &ConnectionConfig) -> Result<Outcome<()>>;
}

/// Lifecycle against a Vault KV v2 store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretLifecycle;

impl SecretLifecycle {
    pub fn new() -> Self {
        Self
    }

    fn store_for(spec: &SecretSpec, connection: &ConnectionConfig) -> Result<VaultKvClient> {
        spec.validate()?;
        let resolved = connection.resolve(&spec.server, spec.token.as_ref())?;
        VaultKvClient::new(&resolved, &spec.mount_path, &spec.path)
    }
}

#[async_trait]
impl ResourceLifecycle for SecretLifecycle {
    async fn create(
        &self,
        spec: SecretSpec,
        connection: &ConnectionConfig,
    ) -> Result<Outcome<SecretSpec>> {
        let span = invocation_span!("create", spec.path);
        async {
            info!("Running creation handler");
            let store = Self::store_for(&spec, connection)?;
            create_secret(&store, spec).await
        }
        .instrument(span)
        .await
    }

    async fn read(
        &self,
        spec: SecretSpec,
        connection: &ConnectionConfig,
    ) -> Result<Outcome<SecretSpec>> {
        let span = invocation_span!("read", spec.path, version = ?spec.version);
        async {
            info!("Running read handler");
            let store = Self::store_for(&spec, connection)?;
            read_secret(&store, spec).await
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, spec: SecretSpec, connection: &ConnectionConfig) -> Result<Outcome<()>> {
        let span = invocation_span!("delete", spec.path, version = ?spec.version);
        async {
            info!("Running deletion handler");
            let store = Self::store_for(&spec, connection)?;
            delete_secret(&store, spec).await
        }
        .instrument(span)
        .await
    }
}

/// Store versions start at 1; the store reads version 0 as "latest".
fn required_version(spec: &SecretSpec, operation: &str) -> Result<u64> {
    match spec.version {
        Some(0) => Err(Error::invalid_request(format!(
            "version 0 is not a valid version of secret {}; versions start at 1",
            spec.path
        ))),
        Some(version) => Ok(version),
        None => Err(Error::invalid_request(format!(
            "a version is required to {} secret {}",
            operation, spec.path
        ))),
    }
}

/// Write `spec` and read the new version back.
///
/// An empty payload is replaced by `{"value": <generated>}` first. The
/// returned state comes from the read, not from what was sent.
pub async fn create_secret<S>(store: &S, mut spec: SecretSpec) -> Result<Outcome<SecretSpec>>
where
    S: SecretStore + ?Sized,
{
    if spec.data.is_empty() {
        let length = generator::effective_length(spec.secret_length);
        spec.secret_length = NonZeroUsize::new(length);
        spec.data = encoder::generated(generator::generate(spec.secret_length)?);
        info!(path = %spec.path, length, "No secret data given, generated a value");
    }

    let version = store.write_secret(&spec.data).await?;
    spec.version = Some(version);

    read_secret(store, spec).await
}

/// Populate `spec.data` from the store's copy of `spec.version`.
pub async fn read_secret<S>(store: &S, mut spec: SecretSpec) -> Result<Outcome<SecretSpec>>
where
    S: SecretStore + ?Sized,
{
    let version = required_version(&spec, "read")?;

    match store.read_secret_version(version).await? {
        ReadOutcome::Found(data) => {
            spec.data = data;
            Ok(Outcome::Done(spec))
        }
        ReadOutcome::Missing => {
            info!(path = %spec.path, version, "Secret version does not exist");
            Ok(Outcome::NotFound { path: spec.path, version })
        }
    }
}

/// Soft-delete `spec.version`, refusing when it already reads as missing.
pub async fn delete_secret<S>(store: &S, spec: SecretSpec) -> Result<Outcome<()>>
where
    S: SecretStore + ?Sized,
{
    let version = required_version(&spec, "delete")?;

    if let ReadOutcome::Missing = store.read_secret_version(version).await? {
        info!(path = %spec.path, version, "Secret version does not exist, nothing to delete");
        return Ok(Outcome::NotFound { path: spec.path, version });
    }

    store.delete_secret_version(version).await?;
    Ok(Outcome::Done(()))
}
