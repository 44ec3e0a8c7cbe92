//! Progress events returned to the resource framework.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::model::ResourceModel;

/// Terminal status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Success,
    Failed,
}

/// Failure categories understood by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    NotFound,
    AccessDenied,
    ServiceInternalError,
    InternalFailure,
    NetworkFailure,
    InvalidRequest,
}

impl From<&Error> for HandlerErrorCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::NotFound { .. } => HandlerErrorCode::NotFound,
            Error::Forbidden { .. } => HandlerErrorCode::AccessDenied,
            Error::ServiceUnavailable { .. } => HandlerErrorCode::ServiceInternalError,
            Error::Store { .. } | Error::MalformedResponse { .. } | Error::Serialization(_) => {
                HandlerErrorCode::InternalFailure
            }
            Error::Transport(_) => HandlerErrorCode::NetworkFailure,
            Error::InvalidData { .. } | Error::InvalidRequest { .. } | Error::Config { .. } => {
                HandlerErrorCode::InvalidRequest
            }
        }
    }
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<ResourceModel>,
}

impl ProgressEvent {
    /// A successful invocation; `None` means the resource no longer exists.
    pub fn success(resource_model: Option<ResourceModel>) -> Self {
        Self { status: OperationStatus::Success, error_code: None, message: None, resource_model }
    }

    pub fn failed(error_code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            error_code: Some(error_code),
            message: Some(message.into()),
            resource_model: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}
