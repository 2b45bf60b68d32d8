//! Identity envelope shared by every message.
//!
//! Ids are opaque strings used for tracing and correlation across asynchronous
//! boundaries. This layer enforces no uniqueness; callers generate them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::name::MessageName;

/// Message identity + correlation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMeta {
    message_name: MessageName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,
}

impl MessageMeta {
    pub fn new(message_name: MessageName) -> Self {
        Self {
            message_name,
            message_id: None,
            request_id: None,
            correlation_id: None,
            source_id: None,
        }
    }

    pub fn message_name(&self) -> &MessageName {
        &self.message_name
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Assign a fresh, time-ordered (UUIDv7) message id.
    pub fn with_new_message_id(self) -> Self {
        self.with_message_id(Uuid::now_v7().to_string())
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Mark this message as caused by `parent`.
    ///
    /// Copies the parent's request id, inherits its correlation id (falling back
    /// to the parent's message id) and records the parent's message id as the
    /// source. Fields the parent lacks are left untouched.
    pub fn correlated_from(mut self, parent: &MessageMeta) -> Self {
        if let Some(request_id) = parent.request_id.as_ref() {
            self.request_id = Some(request_id.clone());
        }
        if let Some(correlation) = parent.correlation_id.as_ref().or(parent.message_id.as_ref()) {
            self.correlation_id = Some(correlation.clone());
        }
        if let Some(message_id) = parent.message_id.as_ref() {
            self.source_id = Some(message_id.clone());
        }
        self
    }
}

/// Implements the metadata accessors/builders for a message type with a
/// `meta: MessageMeta` field.
macro_rules! impl_message_meta {
    ($t:ident < $($p:ident),+ >) => {
        impl<$($p),+> $t<$($p),+> {
            pub fn meta(&self) -> &$crate::envelope::MessageMeta {
                &self.meta
            }

            pub fn message_name(&self) -> &$crate::name::MessageName {
                self.meta.message_name()
            }

            /// Replace the whole envelope (e.g. one built with
            /// [`crate::MessageMeta::correlated_from`]).
            pub fn with_meta(mut self, meta: $crate::envelope::MessageMeta) -> Self {
                self.meta = meta;
                self
            }

            pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
                self.meta = self.meta.with_message_id(id);
                self
            }

            pub fn with_new_message_id(mut self) -> Self {
                self.meta = self.meta.with_new_message_id();
                self
            }

            pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
                self.meta = self.meta.with_request_id(id);
                self
            }

            pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
                self.meta = self.meta.with_correlation_id(id);
                self
            }

            pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
                self.meta = self.meta.with_source_id(id);
                self
            }
        }
    };
}

pub(crate) use impl_message_meta;
