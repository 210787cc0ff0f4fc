//! Connection handler configurations.
//!
//! A [`ConnHandler`] is anything that can describe the namespaces a
//! connection serves: a bare [`Events`] table (the default namespace), a
//! [`Namespaces`] table, or a [`WithTimeout`] wrapper that also carries
//! read/write timeouts. Handlers built separately are combined with [`join`].

use crate::config::TimeoutConfig;
use crate::event::Events;
use crate::namespace::Namespaces;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Read/write timeouts attached to a handler configuration.
///
/// A zero duration means "unspecified": the connection layer should use its
/// own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Timeouts {
    /// Read timeout.
    pub read: Duration,
    /// Write timeout.
    pub write: Duration,
}

impl Timeouts {
    /// Create a timeout pair.
    #[must_use]
    pub const fn new(read: Duration, write: Duration) -> Self {
        Self { read, write }
    }

    /// Check if neither timeout is set.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.read.is_zero() && self.write.is_zero()
    }

    /// Read timeout, or `default` when unspecified.
    #[must_use]
    pub fn read_or(&self, default: Duration) -> Duration {
        if self.read.is_zero() {
            default
        } else {
            self.read
        }
    }

    /// Write timeout, or `default` when unspecified.
    #[must_use]
    pub fn write_or(&self, default: Duration) -> Duration {
        if self.write.is_zero() {
            default
        } else {
            self.write
        }
    }
}

impl From<Timeouts> for (Duration, Duration) {
    fn from(timeouts: Timeouts) -> Self {
        (timeouts.read, timeouts.write)
    }
}

/// Namespace configuration annotated with connection timeouts.
///
/// Routing is exactly that of the embedded tables; the timeouts are read
/// separately through [`ConnHandler::timeouts`].
pub struct WithTimeout<C: ?Sized> {
    /// Read timeout (zero = unspecified).
    pub read_timeout: Duration,
    /// Write timeout (zero = unspecified).
    pub write_timeout: Duration,
    /// Named namespaces.
    pub namespaces: Namespaces<C>,
    /// Default namespace events, applied after `namespaces`.
    ///
    /// Always claims the default namespace when flattened, even when empty.
    pub events: Events<C>,
}

impl<C: ?Sized> WithTimeout<C> {
    /// Create a wrapper with no timeouts and no tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_timeout: Duration::ZERO,
            write_timeout: Duration::ZERO,
            namespaces: Namespaces::new(),
            events: Events::new(),
        }
    }

    /// Create a wrapper using the timeouts from configuration.
    #[must_use]
    pub fn from_config(config: &TimeoutConfig) -> Self {
        let timeouts = config.timeouts();
        debug!(
            read_timeout = ?timeouts.read,
            write_timeout = ?timeouts.write,
            "Applying configured connection timeouts"
        );
        Self::new()
            .read_timeout(timeouts.read)
            .write_timeout(timeouts.write)
    }

    /// Set the read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the named namespaces.
    #[must_use]
    pub fn namespaces(mut self, namespaces: Namespaces<C>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Set the default namespace events.
    #[must_use]
    pub fn events(mut self, events: Events<C>) -> Self {
        self.events = events;
        self
    }

    /// The configured timeouts.
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::new(self.read_timeout, self.write_timeout)
    }

    /// Flatten the embedded tables into one namespace table.
    #[must_use]
    pub fn flatten(&self) -> Namespaces<C> {
        self.clone().into_namespaces()
    }

    /// Consuming form of [`WithTimeout::flatten`].
    #[must_use]
    pub fn into_namespaces(self) -> Namespaces<C> {
        let mut namespaces = Namespaces::new();
        namespaces.absorb(self.namespaces);
        namespaces.absorb(self.events.into_namespaces());
        namespaces
    }
}

impl<C: ?Sized> Default for WithTimeout<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> Clone for WithTimeout<C> {
    fn clone(&self) -> Self {
        Self {
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            namespaces: self.namespaces.clone(),
            events: self.events.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for WithTimeout<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithTimeout")
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("namespaces", &self.namespaces)
            .field("events", &self.events)
            .finish()
    }
}

/// A routable connection handler configuration.
pub enum ConnHandler<C: ?Sized> {
    /// Events for the default namespace.
    Events(Events<C>),
    /// Events per namespace.
    Namespaces(Namespaces<C>),
    /// Namespaces and events with connection timeouts.
    WithTimeout(WithTimeout<C>),
}

impl<C: ?Sized> ConnHandler<C> {
    /// Flatten into the equivalent namespace table.
    #[must_use]
    pub fn flatten(&self) -> Namespaces<C> {
        match self {
            ConnHandler::Events(events) => events.flatten(),
            ConnHandler::Namespaces(namespaces) => namespaces.flatten(),
            ConnHandler::WithTimeout(with_timeout) => with_timeout.flatten(),
        }
    }

    /// Consuming form of [`ConnHandler::flatten`].
    #[must_use]
    pub fn into_namespaces(self) -> Namespaces<C> {
        match self {
            ConnHandler::Events(events) => events.into_namespaces(),
            ConnHandler::Namespaces(namespaces) => namespaces,
            ConnHandler::WithTimeout(with_timeout) => with_timeout.into_namespaces(),
        }
    }

    /// The timeouts carried by this configuration.
    ///
    /// Only [`ConnHandler::WithTimeout`] carries timeouts; the other variants
    /// yield the unspecified (zero) pair.
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        match self {
            ConnHandler::WithTimeout(with_timeout) => with_timeout.timeouts(),
            ConnHandler::Events(_) | ConnHandler::Namespaces(_) => Timeouts::default(),
        }
    }
}

impl<C: ?Sized> Clone for ConnHandler<C> {
    fn clone(&self) -> Self {
        match self {
            ConnHandler::Events(events) => ConnHandler::Events(events.clone()),
            ConnHandler::Namespaces(namespaces) => ConnHandler::Namespaces(namespaces.clone()),
            ConnHandler::WithTimeout(with_timeout) => ConnHandler::WithTimeout(with_timeout.clone()),
        }
    }
}

impl<C: ?Sized> fmt::Debug for ConnHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnHandler::Events(events) => f.debug_tuple("Events").field(events).finish(),
            ConnHandler::Namespaces(namespaces) => {
                f.debug_tuple("Namespaces").field(namespaces).finish()
            }
            ConnHandler::WithTimeout(with_timeout) => {
                f.debug_tuple("WithTimeout").field(with_timeout).finish()
            }
        }
    }
}

impl<C: ?Sized> From<Events<C>> for ConnHandler<C> {
    fn from(events: Events<C>) -> Self {
        ConnHandler::Events(events)
    }
}

impl<C: ?Sized> From<Namespaces<C>> for ConnHandler<C> {
    fn from(namespaces: Namespaces<C>) -> Self {
        ConnHandler::Namespaces(namespaces)
    }
}

impl<C: ?Sized> From<WithTimeout<C>> for ConnHandler<C> {
    fn from(with_timeout: WithTimeout<C>) -> Self {
        ConnHandler::WithTimeout(with_timeout)
    }
}

/// Join handler configurations into one namespace table.
///
/// Handlers are applied in order. When several define the same namespace,
/// the last one's event table replaces the earlier ones entirely.
#[must_use]
pub fn join<'a, C, I>(handlers: I) -> Namespaces<C>
where
    C: ?Sized + 'a,
    I: IntoIterator<Item = &'a ConnHandler<C>>,
{
    let mut namespaces = Namespaces::new();
    for handler in handlers {
        namespaces.absorb(handler.flatten());
    }
    namespaces
}

/// Get the timeouts carried by a handler configuration.
#[must_use]
pub fn timeouts_of<C: ?Sized>(handler: &ConnHandler<C>) -> Timeouts {
    handler.timeouts()
}
