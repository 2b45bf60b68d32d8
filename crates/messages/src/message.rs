//! Runtime message category and the static message → response pairing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use msgapi_error::AppResult;

use crate::api::MessageApi;
use crate::envelope::MessageMeta;

/// Category a message is routed by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Fire-and-forget notification; no response.
    Event,
    /// State-changing request answered by a `CommandResponse`.
    Command,
    /// Query expecting exactly one result.
    Get,
    /// Query expecting a page of results.
    Find,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Event => "event",
            MessageKind::Command => "command",
            MessageKind::Get => "get",
            MessageKind::Find => "find",
        }
    }
}

impl core::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message that knows its category, its response type and which
/// [`MessageApi`] operation executes it.
///
/// Implemented by [`crate::Event`], [`crate::Command`], [`crate::GetQuery`] and
/// [`crate::FindQuery`]; [`MessageApi::invoke`] is built on it.
#[async_trait]
pub trait ApiMessage: Send + Sized + 'static {
    const KIND: MessageKind;

    /// Response produced once the message has been executed.
    type Response: Send + 'static;

    fn meta(&self) -> &MessageMeta;

    /// Hand the message to the matching typed operation of `api`.
    async fn dispatch<A>(self, api: &A) -> AppResult<Self::Response>
    where
        A: MessageApi + ?Sized;
}

/// Span carrying a message's identity fields.
pub fn message_span(meta: &MessageMeta, kind: MessageKind) -> tracing::Span {
    tracing::debug_span!(
        "message",
        message_name = %meta.message_name(),
        kind = %kind,
        message_id = meta.message_id(),
        request_id = meta.request_id(),
        correlation_id = meta.correlation_id(),
        source_id = meta.source_id(),
    )
}

/// Dispatch inside the message's span. The outcome is returned unchanged.
pub(crate) async fn dispatch_traced<M, A>(message: M, api: &A) -> AppResult<M::Response>
where
    M: ApiMessage,
    A: MessageApi + ?Sized,
{
    let span = message_span(message.meta(), M::KIND);
    async move {
        tracing::debug!("dispatching message");
        let outcome = message.dispatch(api).await;
        if let Err(err) = &outcome {
            tracing::debug!(key = err.key(), error = %err, "message failed");
        }
        outcome
    }
    .instrument(span)
    .await
}
