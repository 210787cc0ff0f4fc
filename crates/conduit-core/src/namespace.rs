//! Namespace tables.
//!
//! Namespaces are logical sub-channels multiplexed over one physical
//! connection. A [`Namespaces`] table maps each namespace name to the
//! [`Events`] table that serves it.

use crate::event::Events;
use crate::handler::ConnHandler;
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Name of the default (unnamed) namespace.
pub const DEFAULT_NAMESPACE: &str = "";

/// Namespace name to event table bindings.
///
/// Tables are flat: a namespace cannot contain other namespaces.
pub struct Namespaces<C: ?Sized> {
    tables: HashMap<String, Events<C>>,
}

impl<C: ?Sized> Namespaces<C> {
    /// Create an empty namespace table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Bind `events` to `namespace`, replacing any earlier table.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>, events: Events<C>) -> Self {
        self.insert(namespace, events);
        self
    }

    /// Insert an event table, returning the one it replaced.
    pub fn insert(&mut self, namespace: impl Into<String>, events: Events<C>) -> Option<Events<C>> {
        self.tables.insert(namespace.into(), events)
    }

    /// Get the event table for a namespace.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&Events<C>> {
        self.tables.get(namespace)
    }

    /// Get the event table for the default namespace.
    #[must_use]
    pub fn default_events(&self) -> Option<&Events<C>> {
        self.get(DEFAULT_NAMESPACE)
    }

    /// Check if a namespace is defined.
    #[must_use]
    pub fn contains(&self, namespace: &str) -> bool {
        self.tables.contains_key(namespace)
    }

    /// Number of namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no namespace is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All namespace names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterate over (namespace, events) pairs in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Events<C>> {
        self.tables.iter()
    }

    /// Flatten into a namespace table. This is the identity.
    #[must_use]
    pub fn flatten(&self) -> Namespaces<C> {
        self.clone()
    }

    /// Copy every namespace of `other` into `self`.
    ///
    /// A namespace present in both ends up with `other`'s event table as a
    /// whole; individual events are never merged.
    pub fn absorb(&mut self, other: Namespaces<C>) {
        for (namespace, events) in other.tables {
            if let Some(previous) = self.tables.insert(namespace.clone(), events) {
                debug!(
                    namespace = %namespace,
                    replaced_events = previous.len(),
                    "Replaced namespace event table"
                );
            }
        }
    }
}

impl<C: ?Sized> Default for Namespaces<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> Clone for Namespaces<C> {
    fn clone(&self) -> Self {
        Self {
            tables: self.tables.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Namespaces<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.names() {
            if let Some(events) = self.tables.get(&name) {
                map.entry(&name, events);
            }
        }
        map.finish()
    }
}

impl<C: ?Sized> IntoIterator for Namespaces<C> {
    type Item = (String, Events<C>);
    type IntoIter = hash_map::IntoIter<String, Events<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

impl<'a, C: ?Sized> IntoIterator for &'a Namespaces<C> {
    type Item = (&'a String, &'a Events<C>);
    type IntoIter = hash_map::Iter<'a, String, Events<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

impl<C: ?Sized> Extend<ConnHandler<C>> for Namespaces<C> {
    fn extend<I: IntoIterator<Item = ConnHandler<C>>>(&mut self, iter: I) {
        for handler in iter {
            self.absorb(handler.into_namespaces());
        }
    }
}

impl<C: ?Sized> FromIterator<ConnHandler<C>> for Namespaces<C> {
    fn from_iter<I: IntoIterator<Item = ConnHandler<C>>>(iter: I) -> Self {
        let mut namespaces = Self::new();
        namespaces.extend(iter);
        namespaces
    }
}
