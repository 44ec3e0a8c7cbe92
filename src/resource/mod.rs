//! The managed secret resource and its lifecycle.

pub mod lifecycle;
pub mod spec;

pub use lifecycle::{
    create_secret, delete_secret, read_secret, Outcome, ResourceLifecycle, SecretLifecycle,
};
pub use spec::{SecretSpec, DEFAULT_MOUNT_PATH};
