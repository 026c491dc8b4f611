//! The registration store behind an emitter.

use std::fmt;

use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::handler::Handler;
use crate::key::{EventKey, EventPayload};

/// Unique identity of one registration within a registry.
pub type RegistrationId = Uuid;

/// One stored registration: a handler plus the identity of this particular
/// act of subscribing. The same handler subscribed twice yields two
/// registrations with distinct ids.
pub struct Registration<P> {
    /// Identity of this registration.
    pub id: RegistrationId,
    /// The handler to invoke.
    pub handler: Handler<P>,
}

impl<P> Clone for Registration<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: self.handler.clone(),
        }
    }
}

impl<P> fmt::Debug for Registration<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("handler", &self.handler)
            .finish()
    }
}

/// Counts over a registry, for logs and diagnostics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// Number of event identifiers that have ever been subscribed to.
    pub events: usize,
    /// Total registrations across all identifiers.
    pub handlers: usize,
}

/// Ordered handler lists keyed by event identifier. Pure data, no policy.
///
/// The registry is the single shared backing store behind an emitter: every
/// clone of an emitter and every extension layer wrapping it observes the
/// same lists. It is deliberately a public, live surface — tests and
/// diagnostic tooling may seed or prune registrations directly, and the next
/// publish or unsubscribe sees the change.
///
/// An identifier that was subscribed to and then fully unsubscribed keeps an
/// empty list under its key; an identifier never subscribed to has no key.
/// Both publish as a no-op, but [`contains`](Self::contains) tells them
/// apart.
pub struct EventRegistry<K, P> {
    entries: DashMap<K, Vec<Registration<P>>>,
}

impl<K: EventKey, P: EventPayload> EventRegistry<K, P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Append a handler to the list for `id`, creating the list if absent.
    /// Returns the identity of the new registration.
    pub fn append(&self, id: K, handler: Handler<P>) -> RegistrationId {
        let registration = RegistrationId::new_v4();
        self.entries.entry(id).or_default().push(Registration {
            id: registration,
            handler,
        });
        registration
    }

    /// Remove the registration with the given identity. No-op if it is
    /// already gone, which makes tokens built on this idempotent.
    pub fn remove_registration(&self, id: &K, registration: RegistrationId) {
        if let Some(mut handlers) = self.entries.get_mut(id) {
            if let Some(pos) = handlers.iter().position(|r| r.id == registration) {
                handlers.remove(pos);
            }
        }
    }

    /// Remove the first occurrence of `handler` under `id`, by identity.
    /// One occurrence per call; repeated subscriptions need repeated
    /// removals. No-op if nothing matches.
    pub fn remove_first(&self, id: &K, handler: &Handler<P>) {
        if let Some(mut handlers) = self.entries.get_mut(id) {
            if let Some(pos) = handlers.iter().position(|r| r.handler.ptr_eq(handler)) {
                handlers.remove(pos);
            }
        }
    }

    /// Empty the list for `id`, keeping the key present. No-op if `id` was
    /// never subscribed to.
    pub fn clear_event(&self, id: &K) {
        if let Some(mut handlers) = self.entries.get_mut(id) {
            handlers.clear();
        }
    }

    /// Drop every registration and every key.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// The current registrations for `id`, in registration order.
    ///
    /// This is a snapshot: the returned handlers stay valid however the
    /// registry is mutated afterwards. Cloning is cheap (reference-count
    /// bumps).
    pub fn snapshot(&self, id: &K) -> Vec<Registration<P>> {
        self.entries
            .get(id)
            .map(|handlers| handlers.value().clone())
            .unwrap_or_default()
    }

    /// Number of registrations currently under `id`.
    pub fn handler_count(&self, id: &K) -> usize {
        self.entries.get(id).map(|h| h.len()).unwrap_or(0)
    }

    /// Whether `handler` currently appears under `id`, by identity.
    pub fn is_registered(&self, id: &K, handler: &Handler<P>) -> bool {
        self.entries
            .get(id)
            .is_some_and(|handlers| handlers.iter().any(|r| r.handler.ptr_eq(handler)))
    }

    /// Whether `id` has ever been subscribed to (its key exists, even with an
    /// empty list).
    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of identifiers with a key in the registry.
    pub fn event_count(&self) -> usize {
        self.entries.len()
    }

    /// Current counts, for diagnostics.
    pub fn stats(&self) -> RegistryStats {
        let mut handlers = 0;
        for entry in self.entries.iter() {
            handlers += entry.value().len();
        }
        RegistryStats {
            events: self.entries.len(),
            handlers,
        }
    }
}

impl<K: EventKey, P: EventPayload> Default for EventRegistry<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EventKey, P: EventPayload> fmt::Debug for EventRegistry<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.entries.len())
            .finish()
    }
}
