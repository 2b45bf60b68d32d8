//! Serializable form of [`AppError`] for crossing process boundaries.
//!
//! Receivers recognise the error family through the `isAppError` marker in the
//! payload, not through any Rust type identity.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::error::AppError;
use crate::kind::ErrorKind;
use crate::message_api::MessageApiError;
use crate::options::AppErrorOptions;

/// A cause that was decoded from a record and is only known by its text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RemoteCause(pub String);

/// A record whose `isAppError` marker is not set; it is not one of ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record is not marked as an app error")]
pub struct UnmarkedRecord;

/// Cause of a recorded error: either another error of this family or plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CauseRecord {
    App(Box<AppErrorRecord>),
    Text(String),
}

/// Wire representation of an [`AppError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppErrorRecord {
    pub is_app_error: bool,
    #[serde(default)]
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub extended_info: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<CauseRecord>,
    /// Rendered backtrace of the sender, if one was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl AppErrorRecord {
    /// Whether an arbitrary JSON value carries the `isAppError` marker.
    pub fn is_app_error_value(value: &JsonValue) -> bool {
        value.get("isAppError").and_then(JsonValue::as_bool) == Some(true)
    }

    /// Decode a JSON value into a record if, and only if, it carries the marker.
    pub fn detect(value: &JsonValue) -> Option<Self> {
        if !Self::is_app_error_value(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

impl AppError {
    pub fn to_record(&self) -> AppErrorRecord {
        let cause = self.cause().map(|cause| {
            if let Some(app) = cause.downcast_ref::<AppError>() {
                CauseRecord::App(Box::new(app.to_record()))
            } else if let Some(api) = cause.downcast_ref::<MessageApiError>() {
                CauseRecord::App(Box::new(api.as_app_error().to_record()))
            } else {
                CauseRecord::Text(cause.to_string())
            }
        });

        AppErrorRecord {
            is_app_error: self.is_app_error(),
            kind: self.kind(),
            key: self.key().map(str::to_owned),
            message: (!self.message().is_empty()).then(|| self.message().to_owned()),
            details: self.details().map(str::to_owned),
            extended_info: self.extended_info().clone(),
            cause,
            stack: self.stack().map(|bt| bt.to_string()),
        }
    }
}

impl TryFrom<AppErrorRecord> for AppError {
    type Error = UnmarkedRecord;

    /// Rehydrate a received error. The sender's stack is not carried over.
    /// Records without the marker, at any nesting level, are rejected.
    fn try_from(record: AppErrorRecord) -> Result<Self, Self::Error> {
        if !record.is_app_error {
            return Err(UnmarkedRecord);
        }
        let mut opts = AppErrorOptions::new()
            .data(record.extended_info)
            .capture_stack(false);
        if let Some(key) = record.key {
            opts = opts.key(key);
        }
        if let Some(message) = record.message {
            opts = opts.message(message);
        }
        if let Some(details) = record.details {
            opts = opts.details(details);
        }
        opts = match record.cause {
            Some(CauseRecord::App(inner)) => opts.cause(AppError::try_from(*inner)?),
            Some(CauseRecord::Text(text)) => opts.cause(RemoteCause(text)),
            None => opts,
        };

        Ok(AppError::with_kind(record.kind, opts))
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AppError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = AppErrorRecord::deserialize(deserializer)?;
        AppError::try_from(record).map_err(serde::de::Error::custom)
    }
}
