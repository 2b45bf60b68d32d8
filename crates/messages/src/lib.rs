//! `msgapi-messages` — CQRS message contracts and the dispatch interface.
//!
//! Requests are [`Event`]s, [`Command`]s, [`GetQuery`]s and [`FindQuery`]s, each
//! statically paired with its response shape. A concrete [`MessageApi`]
//! (message bus, RPC transport, in-process router) executes them; none is
//! provided here.

pub mod api;
pub mod command;
pub mod envelope;
pub mod event;
pub mod find_query;
pub mod get_query;
pub mod message;
pub mod name;

pub use api::{MessageApi, MessageBody, ResponseBody};
pub use command::{Command, CommandResponse};
pub use envelope::MessageMeta;
pub use event::Event;
pub use find_query::{DEFAULT_FIND_LIMIT, FindOptions, FindQuery, FindQueryResponse};
pub use get_query::{GetOptions, GetQuery, GetQueryResponse};
pub use message::{ApiMessage, MessageKind, message_span};
pub use name::MessageName;

pub use msgapi_error::{AppError, AppErrorOptions, AppResult, ErrorKind, MessageApiError, keys};
