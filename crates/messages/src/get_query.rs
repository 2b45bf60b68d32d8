//! Single-result queries.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use msgapi_error::{AppErrorOptions, AppResult, MessageApiError, keys};

use crate::api::{MessageApi, MessageBody, ResponseBody};
use crate::envelope::{MessageMeta, impl_message_meta};
use crate::message::{ApiMessage, MessageKind, dispatch_traced};
use crate::name::MessageName;

/// Options for a [`GetQuery`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetOptions {
    /// Fail instead of resolving with an empty response when nothing matches.
    pub fail_if_not_found: bool,
}

/// Query expecting exactly one `R` matching `criteria`.
#[derive(Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "C: Serialize", deserialize = "C: Deserialize<'de>")
)]
pub struct GetQuery<C, R> {
    #[serde(flatten)]
    meta: MessageMeta,
    criteria: C,
    #[serde(default)]
    options: GetOptions,
    #[serde(skip)]
    _result: PhantomData<fn() -> R>,
}

impl<C, R> GetQuery<C, R> {
    pub fn new(message_name: impl Into<String>, criteria: C) -> AppResult<Self> {
        Ok(Self::from_name(MessageName::new(message_name)?, criteria))
    }

    pub fn from_name(message_name: MessageName, criteria: C) -> Self {
        Self {
            meta: MessageMeta::new(message_name),
            criteria,
            options: GetOptions::default(),
            _result: PhantomData,
        }
    }

    pub fn criteria(&self) -> &C {
        &self.criteria
    }

    pub fn options(&self) -> GetOptions {
        self.options
    }

    pub fn with_options(mut self, options: GetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fail_if_not_found(mut self, fail: bool) -> Self {
        self.options.fail_if_not_found = fail;
        self
    }

    /// Build the response for a lookup outcome, honoring `fail_if_not_found`.
    ///
    /// Intended for `MessageApi` implementations.
    pub fn resolve(&self, found: Option<R>) -> AppResult<GetQueryResponse<R>> {
        match found {
            Some(result) => Ok(GetQueryResponse::found(result)),
            None if self.options.fail_if_not_found => Err(MessageApiError::new(
                AppErrorOptions::new()
                    .key(keys::NOT_FOUND)
                    .message(format!("no result for '{}'", self.meta.message_name()))
                    .datum("messageName", self.meta.message_name().as_str())
                    .capture_stack(false),
            )
            .into()),
            None => Ok(GetQueryResponse::not_found()),
        }
    }

    /// Execute through `api.get`.
    pub async fn invoke<A>(self, api: &A) -> AppResult<GetQueryResponse<R>>
    where
        A: MessageApi + ?Sized,
        C: MessageBody,
        R: ResponseBody,
    {
        dispatch_traced(self, api).await
    }
}

impl_message_meta!(GetQuery<C, R>);

impl<C: Clone, R> Clone for GetQuery<C, R> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            criteria: self.criteria.clone(),
            options: self.options,
            _result: PhantomData,
        }
    }
}

impl<C: core::fmt::Debug, R> core::fmt::Debug for GetQuery<C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GetQuery")
            .field("meta", &self.meta)
            .field("criteria", &self.criteria)
            .field("options", &self.options)
            .finish()
    }
}

impl<C: PartialEq, R> PartialEq for GetQuery<C, R> {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta && self.criteria == other.criteria && self.options == other.options
    }
}

#[async_trait]
impl<C, R> ApiMessage for GetQuery<C, R>
where
    C: MessageBody,
    R: ResponseBody,
{
    const KIND: MessageKind = MessageKind::Get;
    type Response = GetQueryResponse<R>;

    fn meta(&self) -> &MessageMeta {
        &self.meta
    }

    async fn dispatch<A>(self, api: &A) -> AppResult<GetQueryResponse<R>>
    where
        A: MessageApi + ?Sized,
    {
        api.get(self).await
    }
}

/// Response to a [`GetQuery`]: the single result, or nothing when the query
/// did not ask to fail on a miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetQueryResponse<R> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<R>,
}

impl<R> GetQueryResponse<R> {
    pub fn found(result: R) -> Self {
        Self {
            result: Some(result),
        }
    }

    pub fn not_found() -> Self {
        Self { result: None }
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn is_found(&self) -> bool {
        self.result.is_some()
    }

    pub fn into_result(self) -> Option<R> {
        self.result
    }
}

impl<R> From<R> for GetQueryResponse<R> {
    fn from(result: R) -> Self {
        Self::found(result)
    }
}
