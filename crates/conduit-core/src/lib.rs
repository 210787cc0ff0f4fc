//! # conduit-core
//!
//! Namespace-based event routing for long-lived, bidirectional connections.
//!
//! This crate provides the routing table a connection layer consults:
//!
//! - **Events** - Event name to handler bindings for one namespace
//! - **Namespaces** - Namespace name to event table bindings
//! - **WithTimeout** - Namespaces/events annotated with read/write timeouts
//! - **ConnHandler** - Any of the above, joined into one table with [`join`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ConnHandler │────▶│ Namespaces  │────▶│   Events    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!    join / flatten     get(namespace)      fire_event
//! ```
//!
//! The connection layer owns sockets and the read loop. It selects the
//! event table with [`Namespaces::get`], then calls [`Events::fire_connect`],
//! [`Events::fire_event`], and [`Events::fire_disconnect`] as the connection
//! joins, talks on, and leaves the namespace.
//!
//! ## Example
//!
//! ```rust
//! use conduit_core::{join, ConnHandler, Events, HandlerError, Message, Namespaces, WithTimeout};
//! use std::time::Duration;
//!
//! struct Conn;
//!
//! let room: Events<Conn> = Events::new().on("join", |_conn, _msg| Ok(()));
//! let lobby: Events<Conn> =
//!     Events::new().on("leave", |_conn, _msg| Err(HandlerError::rejected("closed")));
//!
//! let named: ConnHandler<Conn> = Namespaces::new().namespace("/room", room).into();
//! let default: ConnHandler<Conn> = WithTimeout::new()
//!     .read_timeout(Duration::from_secs(5))
//!     .events(lobby)
//!     .into();
//!
//! let table = join([&named, &default]);
//! assert_eq!(table.names(), vec!["".to_string(), "/room".to_string()]);
//! assert_eq!(default.timeouts().read, Duration::from_secs(5));
//!
//! let events = table.get("/room").unwrap();
//! assert!(events.fire_event(&Conn, &Message::new("/room", "join")).is_ok());
//! ```
//!
//! Tables are built once at startup and only read afterwards, so a joined
//! table can be shared behind an `Arc` by every connection task.

pub mod config;
pub mod event;
pub mod handler;
pub mod message;
pub mod metrics;
pub mod namespace;

pub use config::{ConfigError, TimeoutConfig};
pub use event::{
    is_reserved, validate_event_name, EventNameError, Events, HandlerError, HandlerResult,
    LifecycleEvent, MessageHandler, NO_OP_EVENT, ON_NAMESPACE_CONNECT, ON_NAMESPACE_CONNECTED,
    ON_NAMESPACE_DISCONNECT,
};
pub use handler::{join, timeouts_of, ConnHandler, Timeouts, WithTimeout};
pub use message::Message;
pub use namespace::{Namespaces, DEFAULT_NAMESPACE};
