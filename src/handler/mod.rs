//! Adapter between the resource framework and the lifecycle.
//!
//! [`dispatch`] takes one [`HandlerRequest`], runs the matching
//! [`ResourceLifecycle`] operation and folds every result, including hard
//! failures, into a [`ProgressEvent`]. Failure messages always name the
//! operation and the secret path.

pub mod model;
pub mod progress;

pub use model::{
    Action, HandlerRequest, ResourceModel, SecretDataField, TypeConfiguration, VaultConnection,
};
pub use progress::{HandlerErrorCode, OperationStatus, ProgressEvent};

use tracing::{error, info, warn};

use crate::config::ConnectionConfig;
use crate::errors::Result;
use crate::resource::{Outcome, ResourceLifecycle};

/// Run one request against `lifecycle`.
///
/// `base` is the connection used when the request's type configuration
/// leaves a field unset.
pub async fn dispatch<L>(lifecycle: &L, request: HandlerRequest, base: &ConnectionConfig) -> ProgressEvent
where
    L: ResourceLifecycle + ?Sized,
{
    let action = request.action;
    let connection = request
        .type_configuration
        .as_ref()
        .map(|config| config.connection(base))
        .unwrap_or_else(|| base.clone());

    let Some(model) = request.desired_resource_state else {
        return ProgressEvent::failed(
            HandlerErrorCode::InvalidRequest,
            format!("cannot {} secret: request has no desired resource state", action.as_str()),
        );
    };
    let path = model.secret_path.clone().unwrap_or_default();

    let spec = match model.into_spec() {
        Ok(spec) => spec,
        Err(e) => {
            warn!(error = %e, path = %path, action = action.as_str(), "Rejected resource model");
            return ProgressEvent::failed(
                HandlerErrorCode::from(&e),
                format!("cannot {} secret {}: {}", action.as_str(), path, e),
            );
        }
    };

    let result: Result<Outcome<Option<ResourceModel>>> = match action {
        Action::Create => lifecycle
            .create(spec, &connection)
            .await
            .map(|outcome| outcome.map(|spec| Some(ResourceModel::from_spec(&spec)))),
        Action::Read => lifecycle
            .read(spec, &connection)
            .await
            .map(|outcome| outcome.map(|spec| Some(ResourceModel::from_spec(&spec)))),
        Action::Delete => {
            lifecycle.delete(spec, &connection).await.map(|outcome| outcome.map(|()| None))
        }
        Action::Unsupported => {
            return ProgressEvent::failed(
                HandlerErrorCode::InvalidRequest,
                format!("action not supported for secret {}", path),
            );
        }
    };

    into_event(action, &path, result)
}

fn into_event(
    action: Action,
    path: &str,
    result: Result<Outcome<Option<ResourceModel>>>,
) -> ProgressEvent {
    match result {
        Ok(Outcome::Done(model)) => {
            info!(path = %path, action = action.as_str(), "Handler succeeded");
            ProgressEvent::success(model)
        }
        Ok(Outcome::NotFound { path, version }) => {
            let message = match action {
                Action::Delete => format!(
                    "secret {} version {} does not exist so it can't be deleted",
                    path, version
                ),
                Action::Create => format!(
                    "secret {} version {} does not exist after it was written",
                    path, version
                ),
                _ => format!("secret {} version {} does not exist", path, version),
            };
            info!(path = %path, version, action = action.as_str(), "Secret version not found");
            ProgressEvent::failed(HandlerErrorCode::NotFound, message)
        }
        Err(e) => {
            error!(error = %e, path = %path, action = action.as_str(), "Handler failed");
            ProgressEvent::failed(
                HandlerErrorCode::from(&e),
                format!("{} failed for secret {}: {}", action.as_str(), path, e),
            )
        }
    }
}
