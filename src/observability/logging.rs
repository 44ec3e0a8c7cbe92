//! # Structured Logging
//!
//! Span macros for lifecycle invocations. Every log line emitted while an
//! operation runs carries the operation, the secret path and a random
//! invocation id, so concurrent invocations can be told apart.

/// Create a tracing span for one lifecycle invocation.
///
/// ```rust,ignore
/// let span = invocation_span!("create", spec.path);
/// let span = invocation_span!("read", spec.path, version = 3);
/// ```
#[macro_export]
macro_rules! invocation_span {
    ($operation:expr, $path:expr) => {
        tracing::info_span!(
            "secret_invocation",
            operation = %$operation,
            path = %$path,
            invocation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "secret_invocation",
            operation = %$operation,
            path = %$path,
            invocation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}
