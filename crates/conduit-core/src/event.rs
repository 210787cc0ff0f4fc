//! Event tables and dispatch.
//!
//! An [`Events`] table maps event names to handlers for a single namespace.
//! Lifecycle hooks live in the same map under reserved names, so a table
//! fully describes what happens when a connection joins, talks on, and
//! leaves a namespace.

use crate::message::Message;
use crate::metrics;
use crate::namespace::Namespaces;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Reserved event fired before a connection joins a namespace.
pub const ON_NAMESPACE_CONNECT: &str = "_OnNamespaceConnect";

/// Reserved event fired after a namespace join completes.
pub const ON_NAMESPACE_CONNECTED: &str = "_OnNamespaceConnected";

/// Reserved event fired when a connection leaves a namespace.
///
/// Anything allowed to connect is allowed to disconnect as well.
pub const ON_NAMESPACE_DISCONNECT: &str = "_OnNamespaceDisconnect";

/// Sentinel event name that explicitly means "do nothing".
pub const NO_OP_EVENT: &str = "_NoOp";

/// Prefix shared by every reserved event name.
pub const RESERVED_PREFIX: char = '_';

/// Errors returned by message handlers.
///
/// The dispatch layer never produces these itself; whatever a handler
/// returns is handed back to the caller unchanged.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler refused the operation (e.g. a namespace join).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The message could not be handled as sent.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Any other application error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create a rejection error.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// Event name validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventNameError {
    /// Event name is empty.
    #[error("Event name cannot be empty")]
    Empty,

    /// Event name uses the reserved prefix but is not a lifecycle event.
    #[error("Event name '{0}' uses the reserved '_' prefix")]
    Reserved(String),
}

/// Result type returned by handlers and dispatch.
pub type HandlerResult = Result<(), HandlerError>;

/// A handler invoked with the connection context and the inbound message.
pub type MessageHandler<C> = Arc<dyn Fn(&C, &Message) -> HandlerResult + Send + Sync>;

/// The reserved lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A connection is about to join a namespace.
    Connect,
    /// A namespace join has completed.
    Connected,
    /// A connection is leaving a namespace.
    Disconnect,
    /// Explicit "do nothing" marker.
    NoOp,
}

impl LifecycleEvent {
    /// All lifecycle events.
    pub const ALL: [LifecycleEvent; 4] = [
        LifecycleEvent::Connect,
        LifecycleEvent::Connected,
        LifecycleEvent::Disconnect,
        LifecycleEvent::NoOp,
    ];

    /// The reserved event name this hook is registered under.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Connect => ON_NAMESPACE_CONNECT,
            LifecycleEvent::Connected => ON_NAMESPACE_CONNECTED,
            LifecycleEvent::Disconnect => ON_NAMESPACE_DISCONNECT,
            LifecycleEvent::NoOp => NO_OP_EVENT,
        }
    }

    /// Short label used in metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            LifecycleEvent::Connect => "connect",
            LifecycleEvent::Connected => "connected",
            LifecycleEvent::Disconnect => "disconnect",
            LifecycleEvent::NoOp => "noop",
        }
    }

    /// Look up the lifecycle event registered under `name`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.as_str() == name)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether `name` is one of the reserved lifecycle event names.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    LifecycleEvent::from_name(name).is_some()
}

/// Validate an event name.
///
/// Registration never calls this on its own; applications that want typo
/// protection for lifecycle hooks call it (or [`Events::validate`]) once
/// after building their tables.
///
/// # Errors
///
/// Returns an error if the name is empty, or uses the reserved prefix
/// without being a lifecycle event.
pub fn validate_event_name(name: &str) -> Result<(), EventNameError> {
    if name.is_empty() {
        return Err(EventNameError::Empty);
    }
    if name.starts_with(RESERVED_PREFIX) && !is_reserved(name) {
        return Err(EventNameError::Reserved(name.to_string()));
    }
    Ok(())
}

/// Event name to handler bindings for one namespace.
pub struct Events<C: ?Sized> {
    handlers: HashMap<String, MessageHandler<C>>,
}

impl<C: ?Sized> Events<C> {
    /// Create an empty event table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for `event`, replacing any earlier one.
    #[must_use]
    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C, &Message) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert(event, Arc::new(handler));
        self
    }

    /// Register a lifecycle hook.
    #[must_use]
    pub fn on_lifecycle<F>(self, hook: LifecycleEvent, handler: F) -> Self
    where
        F: Fn(&C, &Message) -> HandlerResult + Send + Sync + 'static,
    {
        self.on(hook.as_str(), handler)
    }

    /// Insert a handler, returning the one it replaced.
    pub fn insert(
        &mut self,
        event: impl Into<String>,
        handler: MessageHandler<C>,
    ) -> Option<MessageHandler<C>> {
        self.handlers.insert(event.into(), handler)
    }

    /// Get the handler registered for `event`.
    #[must_use]
    pub fn handler(&self, event: &str) -> Option<&MessageHandler<C>> {
        self.handlers.get(event)
    }

    /// Check if a handler is registered for `event`.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Number of registered events, lifecycle hooks included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the table has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All registered event names, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Validate every registered event name.
    ///
    /// # Errors
    ///
    /// Returns the first invalid name in sorted order.
    pub fn validate(&self) -> Result<(), EventNameError> {
        self.event_names()
            .iter()
            .try_for_each(|name| validate_event_name(name))
    }

    /// Flatten into a namespace table holding this table as the default namespace.
    #[must_use]
    pub fn flatten(&self) -> Namespaces<C> {
        self.clone().into_namespaces()
    }

    /// Consuming form of [`Events::flatten`].
    #[must_use]
    pub fn into_namespaces(self) -> Namespaces<C> {
        Namespaces::new().namespace(crate::namespace::DEFAULT_NAMESPACE, self)
    }

    /// Fire a lifecycle hook. [`LifecycleEvent::NoOp`] never dispatches.
    ///
    /// # Errors
    ///
    /// Returns exactly the error produced by the hook, if one is registered.
    pub fn fire(&self, hook: LifecycleEvent, conn: &C, msg: &Message) -> HandlerResult {
        if hook == LifecycleEvent::NoOp {
            return Ok(());
        }
        metrics::record_lifecycle(hook);
        self.dispatch(hook.as_str(), conn, msg)
    }

    /// Fire the namespace connect hook, if registered.
    ///
    /// # Errors
    ///
    /// Returns the hook's error; a join should be refused when this fails.
    pub fn fire_connect(&self, conn: &C, msg: &Message) -> HandlerResult {
        self.fire(LifecycleEvent::Connect, conn, msg)
    }

    /// Fire the namespace connected hook, if registered.
    ///
    /// # Errors
    ///
    /// Returns the hook's error.
    pub fn fire_connected(&self, conn: &C, msg: &Message) -> HandlerResult {
        self.fire(LifecycleEvent::Connected, conn, msg)
    }

    /// Fire the namespace disconnect hook, if registered.
    ///
    /// # Errors
    ///
    /// Returns the hook's error.
    pub fn fire_disconnect(&self, conn: &C, msg: &Message) -> HandlerResult {
        self.fire(LifecycleEvent::Disconnect, conn, msg)
    }

    /// Dispatch a message to the handler registered for `msg.event`.
    ///
    /// Unmatched events are ignored and reported as success.
    ///
    /// # Errors
    ///
    /// Returns exactly the error produced by the matched handler.
    pub fn fire_event(&self, conn: &C, msg: &Message) -> HandlerResult {
        self.dispatch(&msg.event, conn, msg)
    }

    fn dispatch(&self, event: &str, conn: &C, msg: &Message) -> HandlerResult {
        let Some(handler) = self.handlers.get(event) else {
            trace!(namespace = %msg.namespace, event = %event, "No handler registered");
            metrics::record_event(metrics::Outcome::Unmatched);
            return Ok(());
        };

        let result = handler(conn, msg);
        metrics::record_event(if result.is_ok() {
            metrics::Outcome::Handled
        } else {
            metrics::Outcome::Failed
        });
        result
    }
}

impl<C: ?Sized> Default for Events<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> Clone for Events<C> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Events<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("events", &self.event_names())
            .finish()
    }
}

impl<C: ?Sized> FromIterator<(String, MessageHandler<C>)> for Events<C> {
    fn from_iter<I: IntoIterator<Item = (String, MessageHandler<C>)>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestConn {
        calls: AtomicUsize,
    }

    impl TestConn {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn counting(conn: &TestConn, _msg: &Message) -> HandlerResult {
        conn.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[test]
    fn test_fire_event_dispatches_by_name() {
        let events = Events::new().on("ping", counting);
        let conn = TestConn::new();

        events.fire_event(&conn, &Message::new("", "ping")).unwrap();
        assert_eq!(conn.calls(), 1);
    }

    #[test]
    fn test_fire_event_unmatched_is_noop() {
        let events = Events::new().on("pong", counting);
        let conn = TestConn::new();

        assert!(events.fire_event(&conn, &Message::new("", "ping")).is_ok());
        assert_eq!(conn.calls(), 0);
    }

    #[test]
    fn test_fire_event_returns_handler_error() {
        let events: Events<TestConn> =
            Events::new().on("ping", |_, _| Err(HandlerError::rejected("not today")));
        let conn = TestConn::new();

        match events.fire_event(&conn, &Message::new("", "ping")) {
            Err(HandlerError::Rejected(reason)) => assert_eq!(reason, "not today"),
            other => panic!("Expected Rejected error, got {:?}", other),
        }
    }

    #[test]
    fn test_lifecycle_hooks_ignore_message_event() {
        let events = Events::new()
            .on_lifecycle(LifecycleEvent::Connect, counting)
            .on_lifecycle(LifecycleEvent::Disconnect, |_: &TestConn, _: &Message| {
                Err(HandlerError::rejected("stay"))
            });
        let conn = TestConn::new();
        let msg = Message::new("/chat", "unrelated");

        events.fire_connect(&conn, &msg).unwrap();
        assert_eq!(conn.calls(), 1);
        assert!(matches!(
            events.fire_disconnect(&conn, &msg),
            Err(HandlerError::Rejected(_))
        ));
        // No connected hook registered
        assert!(events.fire_connected(&conn, &msg).is_ok());
        // The message's own event is never consulted
        assert!(events.fire_event(&conn, &msg).is_ok());
        assert_eq!(conn.calls(), 1);
    }

    #[test]
    fn test_missing_lifecycle_hooks_succeed() {
        let events: Events<TestConn> = Events::new();
        let conn = TestConn::new();
        let msg = Message::new("", "");

        assert!(events.fire_connect(&conn, &msg).is_ok());
        assert!(events.fire_connected(&conn, &msg).is_ok());
        assert!(events.fire_disconnect(&conn, &msg).is_ok());
    }

    #[test]
    fn test_noop_never_dispatches() {
        let events = Events::new().on(NO_OP_EVENT, counting);
        let conn = TestConn::new();

        events
            .fire(LifecycleEvent::NoOp, &conn, &Message::new("", ""))
            .unwrap();
        assert_eq!(conn.calls(), 0);
    }

    #[test]
    fn test_reserved_name_through_fire_event() {
        let events = Events::new().on_lifecycle(LifecycleEvent::Connect, counting);
        let conn = TestConn::new();

        // A client-sent event carrying a reserved name is a plain lookup.
        events
            .fire_event(&conn, &Message::lifecycle("", LifecycleEvent::Connect))
            .unwrap();
        assert_eq!(conn.calls(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let events: Events<TestConn> = Events::new()
            .on("ping", |_, _| Err(HandlerError::rejected("first")))
            .on("ping", |_, _| Ok(()));
        let conn = TestConn::new();

        assert_eq!(events.len(), 1);
        assert!(events.fire_event(&conn, &Message::new("", "ping")).is_ok());
    }

    #[test]
    fn test_insert_returns_replaced_handler() {
        let mut events: Events<TestConn> = Events::new();
        let handler: MessageHandler<TestConn> = Arc::new(counting);

        assert!(events.insert("ping", handler.clone()).is_none());
        let replaced = events.insert("ping", Arc::new(counting)).unwrap();
        assert!(Arc::ptr_eq(&replaced, &handler));
    }

    #[test]
    fn test_events_from_handler_pairs() {
        let ping: MessageHandler<TestConn> = Arc::new(counting);
        let events: Events<TestConn> = vec![
            ("ping".to_string(), ping.clone()),
            ("pong".to_string(), Arc::new(counting) as MessageHandler<TestConn>),
        ]
        .into_iter()
        .collect();

        assert_eq!(events.event_names(), vec!["ping".to_string(), "pong".to_string()]);
        assert!(Arc::ptr_eq(events.handler("ping").unwrap(), &ping));
    }

    #[test]
    fn test_lifecycle_names() {
        for hook in LifecycleEvent::ALL {
            assert_eq!(LifecycleEvent::from_name(hook.as_str()), Some(hook));
            assert!(is_reserved(hook.as_str()));
        }
        assert_eq!(LifecycleEvent::Connect.to_string(), ON_NAMESPACE_CONNECT);
        assert_eq!(LifecycleEvent::from_name("connect"), None);
    }

    #[test]
    fn test_event_name_validation() {
        assert!(validate_event_name("chat:message").is_ok());
        assert!(validate_event_name(ON_NAMESPACE_DISCONNECT).is_ok());
        assert_eq!(validate_event_name(""), Err(EventNameError::Empty));
        assert_eq!(
            validate_event_name("_OnNamespaceConect"),
            Err(EventNameError::Reserved("_OnNamespaceConect".to_string()))
        );

        let events = Events::new()
            .on("join", counting)
            .on("_OnNamespaceDisconect", counting);
        assert!(matches!(
            events.validate(),
            Err(EventNameError::Reserved(_))
        ));
    }

    #[test]
    fn test_events_flatten_to_default_namespace() {
        let events = Events::new().on("ping", counting);
        let namespaces = events.flatten();

        assert_eq!(namespaces.len(), 1);
        let default = namespaces.get("").unwrap();
        assert!(Arc::ptr_eq(
            default.handler("ping").unwrap(),
            events.handler("ping").unwrap()
        ));

        // Empty tables still claim the default namespace
        let empty: Events<TestConn> = Events::new();
        assert_eq!(empty.flatten().names(), vec![String::new()]);
    }
}
