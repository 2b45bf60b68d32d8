use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use msgapi_error::AppResult;

use crate::api::{MessageApi, MessageBody};
use crate::envelope::{MessageMeta, impl_message_meta};
use crate::message::{ApiMessage, MessageKind, dispatch_traced};
use crate::name::MessageName;

/// Fire-and-forget notification. There is no response beyond acceptance.
///
/// The payload may be adjusted after construction (e.g. enriched before
/// publishing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event<P> {
    #[serde(flatten)]
    meta: MessageMeta,
    payload: P,
}

impl<P> Event<P> {
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

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: P) {
        self.payload = payload;
    }

    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Hand off through `api.publish`.
    pub async fn invoke<A>(self, api: &A) -> AppResult<()>
    where
        A: MessageApi + ?Sized,
        P: MessageBody,
    {
        dispatch_traced(self, api).await
    }
}

impl_message_meta!(Event<P>);

#[async_trait]
impl<P> ApiMessage for Event<P>
where
    P: MessageBody,
{
    const KIND: MessageKind = MessageKind::Event;
    type Response = ();

    fn meta(&self) -> &MessageMeta {
        &self.meta
    }

    async fn dispatch<A>(self, api: &A) -> AppResult<()>
    where
        A: MessageApi + ?Sized,
    {
        api.publish(self).await
    }
}
