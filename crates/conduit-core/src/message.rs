//! Message types consumed by the dispatch layer.
//!
//! The connection layer decodes inbound traffic into a [`Message`] before it
//! reaches an event table. Only the namespace and event name matter for
//! routing; the body is passed through to handlers untouched.

use crate::event::LifecycleEvent;
use bytes::Bytes;

/// An inbound message, already decoded by the connection layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Namespace the message belongs to ("" for the default namespace).
    pub namespace: String,
    /// Event name used to select a handler.
    pub event: String,
    /// Raw message body.
    pub body: Bytes,
}

impl Message {
    /// Create a new message with an empty body.
    #[must_use]
    pub fn new(namespace: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            event: event.into(),
            body: Bytes::new(),
        }
    }

    /// Create the message a connection layer hands to a lifecycle hook.
    #[must_use]
    pub fn lifecycle(namespace: impl Into<String>, hook: LifecycleEvent) -> Self {
        Self::new(namespace, hook.as_str())
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Get the body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether this message targets the default namespace.
    #[must_use]
    pub fn is_default_namespace(&self) -> bool {
        self.namespace.is_empty()
    }
}
