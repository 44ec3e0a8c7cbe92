//! Secret store access for a single versioned secret.
//!
//! The store is a HashiCorp Vault KV v2 engine (or anything speaking its
//! HTTP API): every write creates a new immutable version, and deletes are
//! soft, nulling a version's data while keeping its number allocated.
//!
//! # Layout
//!
//! - [`client`]: the [`SecretStore`] trait and [`ReadOutcome`]
//! - [`vault`]: [`VaultKvClient`], the HTTP implementation, plus the pure
//!   helpers for auth headers and failure interpretation
//! - [`encoder`]: the legacy `'k=v', 'k2=v2'` decoding and the generated payload
//! - [`generator`]: CSPRNG-backed URL-safe secret values
//! - [`types`]: [`SecretString`] and [`SecretData`]
//!
//! # Security Considerations
//!
//! - Secret values and tokens are never logged or included in error messages
//! - Tokens are held in [`SecretString`] and zeroed on drop
//! - Nothing is cached between invocations

pub mod client;
pub mod encoder;
pub mod generator;
pub mod types;
pub mod vault;

pub use client::{ReadOutcome, SecretStore};
pub use types::{SecretData, SecretString};
pub use vault::{auth_headers, interpret_failure, VaultKvClient};
