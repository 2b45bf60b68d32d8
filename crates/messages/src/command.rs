//! Commands and their correlation responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use msgapi_error::AppResult;

use crate::api::{MessageApi, MessageBody};
use crate::envelope::{MessageMeta, impl_message_meta};
use crate::message::{ApiMessage, MessageKind, dispatch_traced};
use crate::name::MessageName;

/// Request to change state, carrying a `payload`.
///
/// Answered by a [`CommandResponse`]. Whether the command is processed before
/// the response or only accepted for later processing is up to the
/// [`MessageApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command<P> {
    #[serde(flatten)]
    meta: MessageMeta,
    payload: P,
}

impl<P> Command<P> {
    pub fn new(message_name: impl Into<String>, payload: P) -> AppResult<Self> {
        Ok(Self::from_name(MessageName::new(message_name)?, payload))
    }

    pub fn from_name(message_name: MessageName, payload: P) -> Self {
        Self {
            meta: MessageMeta::new(message_name),
            payload,
        }
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Execute through `api.command`.
    pub async fn invoke<A>(self, api: &A) -> AppResult<CommandResponse>
    where
        A: MessageApi + ?Sized,
        P: MessageBody,
    {
        dispatch_traced(self, api).await
    }
}

impl_message_meta!(Command<P>);

#[async_trait]
impl<P> ApiMessage for Command<P>
where
    P: MessageBody,
{
    const KIND: MessageKind = MessageKind::Command;
    type Response = CommandResponse;

    fn meta(&self) -> &MessageMeta {
        &self.meta
    }

    async fn dispatch<A>(self, api: &A) -> AppResult<CommandResponse>
    where
        A: MessageApi + ?Sized,
    {
        api.command(self).await
    }
}

/// Outcome handle of a [`Command`].
///
/// Echoes the command's correlation fields. `response_id`, when present,
/// identifies the command's processing so its outcome can be looked up later
/// out of band. No lookup operation is part of this contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_id: Option<String>,
}

impl CommandResponse {
    /// Response identified by `command_id` (used as the `response_id`).
    pub fn new(command_id: Option<String>) -> Self {
        Self {
            response_id: command_id,
            ..Self::default()
        }
    }

    /// Response to `command`, echoing its message, request and correlation ids.
    pub fn for_command<P>(command: &Command<P>, command_id: Option<String>) -> Self {
        let meta = command.meta();
        Self {
            correlation_id: meta.correlation_id().map(str::to_owned),
            request_id: meta.request_id().map(str::to_owned),
            message_id: meta.message_id().map(str::to_owned),
            response_id: command_id,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }
}
