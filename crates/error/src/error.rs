//! Base error type of the messaging API.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::kind::ErrorKind;
use crate::options::{AppErrorOptions, SharedCause};

/// Result type used across the messaging API.
pub type AppResult<T> = Result<T, AppError>;

/// Uniform, identifiable failure.
///
/// Carries a machine-readable `key` for programmatic branching, a human
/// `message`, optional `details`, structured `extended_info`, the wrapped
/// `cause` and (unless disabled) a backtrace captured at construction.
///
/// Displayed as `"{key}: {message}"` when a key is present, otherwise as the
/// bare message.
///
/// `details` and `extended_info` are diagnostics. Nothing guarantees they are
/// safe to show to end users.
#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    key: Option<String>,
    message: Option<String>,
    details: Option<String>,
    extended_info: Map<String, JsonValue>,
    cause: Option<SharedCause>,
    stack: Option<Arc<Backtrace>>,
}

impl AppError {
    /// Build a plain application error.
    pub fn new(opts: AppErrorOptions) -> Self {
        Self::with_kind(ErrorKind::App, opts)
    }

    /// Shorthand for an error with just a key and a message.
    pub fn keyed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AppErrorOptions::new().key(key).message(message))
    }

    /// Build an error tagged with a specific [`ErrorKind`].
    #[inline(never)]
    pub fn with_kind(kind: ErrorKind, opts: AppErrorOptions) -> Self {
        let stack = opts
            .capture_stack
            .then(|| Arc::new(Backtrace::force_capture()));

        Self {
            kind,
            key: opts.key,
            message: opts.message,
            details: opts.details,
            extended_info: opts.data,
            cause: opts.cause,
            stack,
        }
    }

    /// Capability marker for this error family. Always `true`.
    pub fn is_app_error(&self) -> bool {
        true
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether this error was raised by the messaging layer itself.
    pub fn is_message_api_error(&self) -> bool {
        self.kind == ErrorKind::MessageApi
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// The raw message, without the key prefix.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn extended_info(&self) -> &Map<String, JsonValue> {
        &self.extended_info
    }

    /// The wrapped originating failure, if any. Only one level is exposed here;
    /// use [`StdError::source`] to walk further.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Backtrace captured at construction (`None` when capture was disabled).
    pub fn stack(&self) -> Option<&Backtrace> {
        self.stack.as_deref()
    }
}

impl core::fmt::Display for AppError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (&self.key, &self.message) {
            (Some(key), Some(message)) => write!(f, "{key}: {message}"),
            (Some(key), None) => f.write_str(key),
            (None, Some(message)) => f.write_str(message),
            (None, None) => Ok(()),
        }
    }
}

impl core::fmt::Debug for AppError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("message", &self.message)
            .field("details", &self.details)
            .field("extended_info", &self.extended_info)
            .field("cause", &self.cause)
            .field("stack_captured", &self.stack.is_some())
            .finish()
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}
