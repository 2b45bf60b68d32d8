//! Paged, multi-result queries.
//!
//! Pagination is cursor-style: a response with `has_more = true` means a
//! follow-up query whose offset is advanced by the number of returned results
//! yields more results. `has_more = false` is authoritative termination.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use msgapi_error::AppResult;

use crate::api::{MessageApi, MessageBody, ResponseBody};
use crate::envelope::{MessageMeta, impl_message_meta};
use crate::message::{ApiMessage, MessageKind, dispatch_traced};
use crate::name::MessageName;

/// Page size used when a [`FindQuery`] does not set one.
pub const DEFAULT_FIND_LIMIT: usize = 100;

/// Options for a [`FindQuery`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindOptions {
    /// Maximum results per page; [`DEFAULT_FIND_LIMIT`] when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Number of results to skip (0-based).
    pub offset: usize,
}

/// Query expecting a page of `R`s matching `criteria`.
#[derive(Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "C: Serialize", deserialize = "C: Deserialize<'de>")
)]
pub struct FindQuery<C, R> {
    #[serde(flatten)]
    meta: MessageMeta,
    criteria: C,
    #[serde(default)]
    options: FindOptions,
    #[serde(skip)]
    _result: PhantomData<fn() -> R>,
}

impl<C, R> FindQuery<C, R> {
    pub fn new(message_name: impl Into<String>, criteria: C) -> AppResult<Self> {
        Ok(Self::from_name(MessageName::new(message_name)?, criteria))
    }

    pub fn from_name(message_name: MessageName, criteria: C) -> Self {
        Self {
            meta: MessageMeta::new(message_name),
            criteria,
            options: FindOptions::default(),
            _result: PhantomData,
        }
    }

    pub fn criteria(&self) -> &C {
        &self.criteria
    }

    pub fn options(&self) -> FindOptions {
        self.options
    }

    pub fn with_options(mut self, options: FindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.options.offset = offset;
        self
    }

    /// Effective page size: `options.limit`, or [`DEFAULT_FIND_LIMIT`].
    pub fn limit(&self) -> usize {
        self.options.limit.unwrap_or(DEFAULT_FIND_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.options.offset
    }

    /// Follow-up query for the page after `response`, or `None` once
    /// `has_more` is false or the page cannot advance. Criteria, options and
    /// ids are carried over.
    pub fn next_page(&self, response: &FindQueryResponse<R>) -> Option<Self>
    where
        C: Clone,
    {
        let offset = response.next_offset()?;
        Some(self.clone().with_offset(offset))
    }

    /// Execute through `api.find`.
    pub async fn invoke<A>(self, api: &A) -> AppResult<FindQueryResponse<R>>
    where
        A: MessageApi + ?Sized,
        C: MessageBody,
        R: ResponseBody,
    {
        dispatch_traced(self, api).await
    }
}

impl_message_meta!(FindQuery<C, R>);

impl<C: Clone, R> Clone for FindQuery<C, R> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            criteria: self.criteria.clone(),
            options: self.options,
            _result: PhantomData,
        }
    }
}

impl<C: core::fmt::Debug, R> core::fmt::Debug for FindQuery<C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FindQuery")
            .field("meta", &self.meta)
            .field("criteria", &self.criteria)
            .field("options", &self.options)
            .finish()
    }
}

impl<C: PartialEq, R> PartialEq for FindQuery<C, R> {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta && self.criteria == other.criteria && self.options == other.options
    }
}

#[async_trait]
impl<C, R> ApiMessage for FindQuery<C, R>
where
    C: MessageBody,
    R: ResponseBody,
{
    const KIND: MessageKind = MessageKind::Find;
    type Response = FindQueryResponse<R>;

    fn meta(&self) -> &MessageMeta {
        &self.meta
    }

    async fn dispatch<A>(self, api: &A) -> AppResult<FindQueryResponse<R>>
    where
        A: MessageApi + ?Sized,
    {
        api.find(self).await
    }
}

/// One page of results for a [`FindQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindQueryResponse<R> {
    results: Vec<R>,
    /// Offset of the first result in this page.
    #[serde(default)]
    offset: usize,
    #[serde(default)]
    has_more: bool,
}

impl<R> FindQueryResponse<R> {
    /// A single, final page starting at offset 0.
    pub fn new(results: Vec<R>) -> Self {
        Self::page(results, 0, false)
    }

    pub fn page(results: Vec<R>, offset: usize, has_more: bool) -> Self {
        Self {
            results,
            offset,
            has_more,
        }
    }

    pub fn results(&self) -> &[R] {
        &self.results
    }

    pub fn into_results(self) -> Vec<R> {
        self.results
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Offset the next page starts at, if there is one.
    ///
    /// An empty page or an offset past `usize::MAX` ends paging even when
    /// `has_more` is set, since neither can advance.
    pub fn next_offset(&self) -> Option<usize> {
        if !self.has_more || self.results.is_empty() {
            return None;
        }
        self.offset.checked_add(self.results.len())
    }
}

impl<R> Default for FindQueryResponse<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Criteria {
        name_prefix: String,
    }

    fn query() -> FindQuery<Criteria, u32> {
        FindQuery::new(
            "FindUsers",
            Criteria {
                name_prefix: "A".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn default_limit_is_one_hundred() {
        let q = query();
        assert_eq!(q.options().limit, None);
        assert_eq!(q.limit(), DEFAULT_FIND_LIMIT);
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn explicit_limit_wins() {
        assert_eq!(query().with_limit(10).limit(), 10);
    }

    #[test]
    fn response_defaults() {
        let resp = FindQueryResponse::new(vec![1u32, 2, 3]);
        assert_eq!(resp.offset(), 0);
        assert!(!resp.has_more());
        assert_eq!(resp.next_offset(), None);

        let decoded: FindQueryResponse<u32> = serde_json::from_value(json!({"results": [4]})).unwrap();
        assert_eq!(decoded.offset(), 0);
        assert!(!decoded.has_more());
    }

    #[test]
    fn next_page_advances_by_result_count() {
        let q = query().with_limit(10).with_correlation_id("c-1");
        let first = FindQueryResponse::page((0..10).collect(), 0, true);

        let next = q.next_page(&first).expect("continuation");
        assert_eq!(next.offset(), 10);
        assert_eq!(next.limit(), 10);
        assert_eq!(next.criteria(), q.criteria());
        assert_eq!(next.meta().correlation_id(), Some("c-1"));

        let last = FindQueryResponse::page(vec![10, 11], 10, false);
        assert!(next.next_page(&last).is_none());
    }

    #[test]
    fn short_page_with_more_still_advances_by_len() {
        let q = query().with_limit(10).with_offset(20);
        let resp = FindQueryResponse::page(vec![1, 2, 3], 20, true);
        assert_eq!(q.next_page(&resp).map(|n| n.offset()), Some(23));
    }

    #[test]
    fn overflowing_offset_ends_paging() {
        let resp = FindQueryResponse::page(vec![1u32], usize::MAX, true);
        assert_eq!(resp.next_offset(), None);

        let decoded: FindQueryResponse<u32> = serde_json::from_value(
            json!({"results": [1, 2], "offset": usize::MAX - 1, "hasMore": true}),
        )
        .unwrap();
        assert!(query().next_page(&decoded).is_none());
    }

    #[test]
    fn empty_page_with_more_does_not_repeat_the_query() {
        let q = query().with_limit(0).with_offset(5);
        let resp = FindQueryResponse::page(Vec::new(), 5, true);
        assert_eq!(resp.next_offset(), None);
        assert!(q.next_page(&resp).is_none());
    }

    proptest::proptest! {
        /// Property: a continuation exists exactly when `has_more` is set and
        /// starts right after the returned results.
        #[test]
        fn continuation_offset(offset in 0usize..10_000, len in 0usize..200, has_more in proptest::bool::ANY) {
            let q = query().with_offset(offset);
            let resp = FindQueryResponse::page(vec![0u32; len], offset, has_more);
            let next = q.next_page(&resp).map(|n| n.offset());
            proptest::prop_assert_eq!(next, (has_more && len > 0).then_some(offset + len));
        }
    }

    #[test]
    fn serializes_options_camel_case() {
        let value = serde_json::to_value(query().with_limit(5).with_offset(15)).unwrap();
        assert_eq!(value["messageName"], "FindUsers");
        assert_eq!(value["options"], json!({"limit": 5, "offset": 15}));

        let resp = serde_json::to_value(FindQueryResponse::page(vec![1u32], 3, true)).unwrap();
        assert_eq!(resp, json!({"results": [1], "offset": 3, "hasMore": true}));
    }
}
