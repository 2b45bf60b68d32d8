//! `msgapi-error` — structured error model shared by the messaging API.
//!
//! Every failure surfaced by a `MessageApi` implementation is expected to be an
//! [`AppError`] (or a tagged specialization such as [`MessageApiError`]).

pub mod error;
pub mod kind;
pub mod message_api;
pub mod options;
pub mod record;

pub use error::{AppError, AppResult};
pub use kind::ErrorKind;
pub use message_api::{keys, MessageApiError};
pub use options::AppErrorOptions;
pub use record::{AppErrorRecord, CauseRecord, RemoteCause, UnmarkedRecord};
