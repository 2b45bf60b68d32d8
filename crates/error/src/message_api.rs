//! Messaging-layer specialization of [`AppError`].

use std::error::Error as StdError;

use thiserror::Error;

use crate::error::AppError;
use crate::kind::ErrorKind;
use crate::options::AppErrorOptions;

/// Well-known keys for messaging-layer failures.
///
/// Domain failures should use their own keys on a plain [`AppError`].
pub mod keys {
    /// No handler is registered for the message name.
    pub const NO_HANDLER: &str = "NO_HANDLER";
    /// The transport failed to deliver the message or its response.
    pub const TRANSPORT: &str = "TRANSPORT";
    /// No response arrived in time.
    pub const TIMEOUT: &str = "TIMEOUT";
    /// A get query with `fail_if_not_found` matched nothing.
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// A message could not be built or decoded (e.g. empty message name).
    pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
}

/// Error raised by the messaging layer (dispatch, transport, timeout).
///
/// Carries no fields beyond [`AppError`]; it only fixes the kind to
/// [`ErrorKind::MessageApi`]. Converts into `AppError` without loss.
#[derive(Debug, Clone, Error)]
#[error(transparent)]
pub struct MessageApiError(AppError);

impl MessageApiError {
    #[inline(never)]
    pub fn new(opts: AppErrorOptions) -> Self {
        Self(AppError::with_kind(ErrorKind::MessageApi, opts))
    }

    pub fn keyed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AppErrorOptions::new().key(key).message(message))
    }

    pub fn no_handler(message_name: &str) -> Self {
        Self::new(
            AppErrorOptions::new()
                .key(keys::NO_HANDLER)
                .message(format!("no handler registered for '{message_name}'"))
                .datum("messageName", message_name),
        )
    }

    pub fn timeout(message_name: &str) -> Self {
        Self::new(
            AppErrorOptions::new()
                .key(keys::TIMEOUT)
                .message(format!("timed out waiting for '{message_name}'"))
                .datum("messageName", message_name),
        )
    }

    pub fn transport<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(
            AppErrorOptions::new()
                .key(keys::TRANSPORT)
                .message(message)
                .cause(cause),
        )
    }

    /// Shadows the deprecated `Error::cause`, which would win over `Deref`.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.0.cause()
    }

    pub fn as_app_error(&self) -> &AppError {
        &self.0
    }

    pub fn into_app_error(self) -> AppError {
        self.0
    }
}

impl Default for MessageApiError {
    fn default() -> Self {
        Self::new(AppErrorOptions::default())
    }
}

impl core::ops::Deref for MessageApiError {
    type Target = AppError;

    fn deref(&self) -> &AppError {
        &self.0
    }
}

impl From<MessageApiError> for AppError {
    fn from(value: MessageApiError) -> Self {
        value.0
    }
}

impl TryFrom<AppError> for MessageApiError {
    type Error = AppError;

    /// Succeeds only for errors tagged [`ErrorKind::MessageApi`].
    fn try_from(value: AppError) -> Result<Self, Self::Error> {
        if value.is_message_api_error() {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }
}
