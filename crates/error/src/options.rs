//! Construction options for [`crate::AppError`].

use std::error::Error as StdError;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

/// Shared, type-erased originating error.
pub(crate) type SharedCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Everything an [`crate::AppError`] can be built from.
///
/// All fields are optional. Stack capture is on unless turned off with
/// [`AppErrorOptions::capture_stack`].
///
/// ```ignore
/// let err = AppError::new(
///     AppErrorOptions::new()
///         .key("NOT_FOUND")
///         .message("user missing")
///         .datum("id", 42),
/// );
/// assert_eq!(err.to_string(), "NOT_FOUND: user missing");
/// ```
#[derive(Debug, Clone)]
pub struct AppErrorOptions {
    pub(crate) key: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) details: Option<String>,
    pub(crate) data: Map<String, JsonValue>,
    pub(crate) cause: Option<SharedCause>,
    pub(crate) capture_stack: bool,
}

impl Default for AppErrorOptions {
    fn default() -> Self {
        Self {
            key: None,
            message: None,
            details: None,
            data: Map::new(),
            cause: None,
            capture_stack: true,
        }
    }
}

impl AppErrorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable machine-readable error code.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Replace the structured context wholesale.
    pub fn data(mut self, data: Map<String, JsonValue>) -> Self {
        self.data = data;
        self
    }

    /// Add a single entry to the structured context.
    pub fn datum(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Wrap the failure that caused this one.
    pub fn cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Wrap an already boxed cause (e.g. from a `Box<dyn Error>` API).
    pub fn boxed_cause(mut self, cause: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        self.cause = Some(Arc::from(cause));
        self
    }

    /// Skip backtrace capture. Useful for frequent, expected failures.
    pub fn capture_stack(mut self, capture: bool) -> Self {
        self.capture_stack = capture;
        self
    }
}
