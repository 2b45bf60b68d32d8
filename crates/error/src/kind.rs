//! Value-level family tag for [`crate::AppError`].

use serde::{Deserialize, Serialize};

/// Which specialization of the error family an error belongs to.
///
/// Checked by value, so it survives serialization and does not depend on which
/// copy of this crate built the error.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Plain application error; domain failures use this with their own `key`.
    #[default]
    App,
    /// Failure originating in the messaging layer (dispatch, transport, timeout).
    MessageApi,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::App => "app",
            ErrorKind::MessageApi => "message_api",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
