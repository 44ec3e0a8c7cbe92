//! # Configuration Management
//!
//! Connection settings for the secret store and logging settings for the
//! process. Both load from the environment; the CLI layers flags on top.

pub mod settings;

pub use settings::{
    ConnectionConfig, ObservabilityConfig, ENV_VAULT_ADDR, ENV_VAULT_CLIENT_TIMEOUT,
    ENV_VAULT_TOKEN,
};
