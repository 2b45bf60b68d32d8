//! Validated message names.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use msgapi_error::{AppError, AppErrorOptions, AppResult, MessageApiError, keys};

/// Identifies a message's type/intent (e.g. `"CreateUser"`). Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageName(String);

impl MessageName {
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MessageApiError::new(
                AppErrorOptions::new()
                    .key(keys::INVALID_MESSAGE)
                    .message("message name must not be empty")
                    .capture_stack(false),
            )
            .into());
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for MessageName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MessageName {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for MessageName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<MessageName> for String {
    fn from(value: MessageName) -> Self {
        value.0
    }
}
