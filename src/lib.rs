//! # vault-secret
//!
//! Lifecycle handler for a single versioned secret in a Vault KV v2 store.
//! A resource framework asks for one of three actions and gets back one
//! progress event:
//!
//! ```text
//! HandlerRequest → handler::dispatch → SecretLifecycle → VaultKvClient → KV v2 HTTP API
//!                        ↓
//!                  ProgressEvent
//! ```
//!
//! ## Core Components
//!
//! - **Encoder / Generator**: build the key/value payload, either from the
//!   caller's data (structured or legacy string form) or a generated value
//! - **Store Client**: the `SecretStore` trait and its KV v2 implementation
//! - **Lifecycle**: create (write then read back), read, and delete-if-present
//! - **Handler**: maps framework requests and failures onto progress events
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vault_secret::{ConnectionConfig, ResourceLifecycle, SecretLifecycle, SecretSpec};
//!
//! #[tokio::main]
//! async fn main() -> vault_secret::Result<()> {
//!     let connection = ConnectionConfig::from_env()?;
//!     let spec = SecretSpec::new("app/db");
//!     let created = SecretLifecycle::new().create(spec, &connection).await?.into_result()?;
//!     println!("wrote version {:?}", created.version);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod handler;
pub mod observability;
pub mod resource;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::{ConnectionConfig, ObservabilityConfig};
pub use errors::{Error, Result};
pub use handler::{dispatch, HandlerRequest, ProgressEvent};
pub use resource::{Outcome, ResourceLifecycle, SecretLifecycle, SecretSpec};
pub use secrets::{SecretData, SecretStore, SecretString, VaultKvClient};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
