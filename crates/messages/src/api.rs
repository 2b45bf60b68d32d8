//! Dispatch interface a concrete messaging backend must satisfy.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use msgapi_error::AppResult;

use crate::command::{Command, CommandResponse};
use crate::event::Event;
use crate::find_query::{FindQuery, FindQueryResponse};
use crate::get_query::{GetQuery, GetQueryResponse};
use crate::message::{ApiMessage, dispatch_traced};

/// Bound for outgoing payloads and criteria: serializable and thread-safe.
pub trait MessageBody: Serialize + Send + Sync + 'static {}

impl<T> MessageBody for T where T: Serialize + Send + Sync + 'static {}

/// Bound for results carried back in responses.
pub trait ResponseBody: DeserializeOwned + Send + 'static {}

impl<T> ResponseBody for T where T: DeserializeOwned + Send + 'static {}

/// Executes messages and produces their responses.
///
/// Every operation is asynchronous and is a single request/response exchange.
/// How execution happens (in-process router, message bus, RPC) and whether it
/// is synchronous or eventually consistent is up to the implementation.
///
/// ## Failures
///
/// Implementations surface failures as `Err(AppError)`. Messaging-layer
/// failures (no handler, transport, timeout) should be tagged as
/// [`msgapi_error::MessageApiError`]; domain failures keep their own keys.
/// Nothing here retries, suppresses or substitutes fallback values.
///
/// ## Ordering
///
/// No ordering is guaranteed between concurrently in-flight operations. The
/// correlation fields of [`crate::MessageMeta`] exist so callers and
/// implementations can reconstruct causal order themselves.
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Resolve exactly one result.
    ///
    /// When `query.options().fail_if_not_found` is set, a miss must be an error
    /// rather than an empty response ([`GetQuery::resolve`] does this).
    async fn get<C, R>(&self, query: GetQuery<C, R>) -> AppResult<GetQueryResponse<R>>
    where
        C: MessageBody,
        R: ResponseBody;

    /// Resolve a page of at most [`FindQuery::limit`] results starting at
    /// [`FindQuery::offset`], reporting `has_more` accurately.
    async fn find<C, R>(&self, query: FindQuery<C, R>) -> AppResult<FindQueryResponse<R>>
    where
        C: MessageBody,
        R: ResponseBody;

    /// Resolve once the command has been accepted or processed.
    async fn command<P>(&self, command: Command<P>) -> AppResult<CommandResponse>
    where
        P: MessageBody;

    /// Hand an event off for delivery. Events have no response.
    async fn publish<P>(&self, event: Event<P>) -> AppResult<()>
    where
        P: MessageBody;

    /// Generic entry point: routes by the message's category to the matching
    /// typed operation and returns its response.
    async fn invoke<M>(&self, message: M) -> AppResult<M::Response>
    where
        M: ApiMessage,
    {
        dispatch_traced(message, self).await
    }
}

#[async_trait]
impl<T> MessageApi for Arc<T>
where
    T: MessageApi + ?Sized,
{
    async fn get<C, R>(&self, query: GetQuery<C, R>) -> AppResult<GetQueryResponse<R>>
    where
        C: MessageBody,
        R: ResponseBody,
    {
        (**self).get(query).await
    }

    async fn find<C, R>(&self, query: FindQuery<C, R>) -> AppResult<FindQueryResponse<R>>
    where
        C: MessageBody,
        R: ResponseBody,
    {
        (**self).find(query).await
    }

    async fn command<P>(&self, command: Command<P>) -> AppResult<CommandResponse>
    where
        P: MessageBody,
    {
        (**self).command(command).await
    }

    async fn publish<P>(&self, event: Event<P>) -> AppResult<()>
    where
        P: MessageBody,
    {
        (**self).publish(event).await
    }

    async fn invoke<M>(&self, message: M) -> AppResult<M::Response>
    where
        M: ApiMessage,
    {
        (**self).invoke(message).await
    }
}
