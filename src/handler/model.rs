//! Wire shapes exchanged with the resource framework.
//!
//! The framework names fields in PascalCase and, for older resources, sends
//! `SecretData` in the legacy `'k=v', 'k2=v2'` string form. Both forms are
//! accepted; responses always carry the structured map and never the token.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::config::ConnectionConfig;
use crate::errors::{Error, Result};
use crate::resource::{SecretSpec, DEFAULT_MOUNT_PATH};
use crate::secrets::{encoder, generator, SecretData, SecretString};

/// Lifecycle action requested by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Delete,
    #[serde(other)]
    Unsupported,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Delete => "delete",
            Action::Unsupported => "unsupported",
        }
    }
}

/// `SecretData` as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretDataField {
    Map(SecretData),
    Legacy(String),
}

impl SecretDataField {
    /// Decode into the structured map, going through the legacy decoder if needed.
    pub fn decode(&self) -> Result<SecretData> {
        match self {
            SecretDataField::Map(data) => Ok(data.clone()),
            SecretDataField::Legacy(encoded) => encoder::decode_legacy(encoded),
        }
    }
}

/// The resource properties as the framework stores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_data: Option<SecretDataField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_engine_mount_path: Option<String>,

    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,

    /// `0` is the legacy spelling of "use the default length".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl ResourceModel {
    /// Convert into the lifecycle's [`SecretSpec`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if `SecretPath` is missing or `SecretLength`
    ///   is above [`generator::MAX_SECRET_LENGTH`]
    /// - [`Error::InvalidData`] if a legacy `SecretData` string cannot be decoded
    pub fn into_spec(self) -> Result<SecretSpec> {
        let path = self
            .secret_path
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::invalid_request("SecretPath is required"))?;

        let data = match &self.secret_data {
            Some(field) => field.decode()?,
            None => SecretData::new(),
        };

        let secret_length = match self.secret_length {
            None | Some(0) => None,
            Some(n) => {
                let length = usize::try_from(n)
                    .ok()
                    .filter(|&len| len <= generator::MAX_SECRET_LENGTH)
                    .ok_or_else(|| {
                        Error::invalid_request(format!(
                            "SecretLength {} exceeds the maximum of {}",
                            n,
                            generator::MAX_SECRET_LENGTH
                        ))
                    })?;
                NonZeroUsize::new(length)
            }
        };

        let mount_path = self
            .secret_engine_mount_path
            .filter(|m| !m.trim_matches('/').is_empty())
            .unwrap_or_else(|| DEFAULT_MOUNT_PATH.to_string());

        let mut spec = SecretSpec::new(path)
            .with_mount_path(&mount_path)
            .with_server(self.server.as_deref().unwrap_or_default())
            .with_data(data)
            .with_secret_length(secret_length);
        if let Some(token) = self.token.filter(|t| !t.is_empty()) {
            spec = spec.with_token(token);
        }
        if let Some(version) = self.version {
            spec = spec.with_version(version);
        }

        Ok(spec)
    }

    /// Build the model reported back for a materialized secret.
    pub fn from_spec(spec: &SecretSpec) -> Self {
        Self {
            secret_path: Some(spec.path.clone()),
            secret_data: Some(SecretDataField::Map(spec.data.clone())),
            server: Some(spec.server.clone()).filter(|s| !s.is_empty()),
            secret_engine_mount_path: Some(spec.mount_path.clone()),
            token: None,
            secret_length: spec.secret_length.map(|n| n.get() as u64),
            version: spec.version,
        }
    }
}

/// Connection block of the type configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VaultConnection {
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,

    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Per-type configuration the framework attaches to each request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TypeConfiguration {
    #[serde(default)]
    pub vault_connection: Option<VaultConnection>,
}

impl TypeConfiguration {
    /// Overlay the configured connection on `base`; set fields win.
    pub fn connection(&self, base: &ConnectionConfig) -> ConnectionConfig {
        let mut connection = base.clone();
        if let Some(vault) = &self.vault_connection {
            if let Some(server) = vault.server.as_ref().filter(|s| !s.trim().is_empty()) {
                connection.server = server.clone();
            }
            if let Some(token) = vault.token.as_ref().filter(|t| !t.is_empty()) {
                connection.token = Some(token.clone());
            }
            if let Some(timeout_seconds) = vault.timeout_seconds {
                connection.timeout_seconds = timeout_seconds;
            }
        }
        connection
    }
}

/// One invocation as delivered by the framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub action: Action,

    #[serde(default)]
    pub desired_resource_state: Option<ResourceModel>,

    #[serde(default)]
    pub previous_resource_state: Option<ResourceModel>,

    #[serde(default)]
    pub type_configuration: Option<TypeConfiguration>,
}
