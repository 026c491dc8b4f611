//! Emitter core implementation.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::compose::Compose;
use crate::handler::Handler;
use crate::key::{EventKey, EventPayload};
use crate::registry::{EventRegistry, RegistryStats};
use crate::subscription::Subscription;
use crate::traits::{EventTypes, Inspect, Publish, Subscribe};

/// Emitter configuration.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Emit `tracing` events on subscribe, unsubscribe and publish.
    pub enable_logging: bool,

    /// Optional label attached to log lines, for telling emitters apart.
    pub label: Option<String>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            label: None,
        }
    }
}

/// Typed publish/subscribe emitter.
///
/// `K` identifies event classes, `P` is the payload handlers receive. The
/// handler signature is checked against `P` at compile time; the emitter
/// itself performs no runtime payload validation.
///
/// All operations are synchronous and run to completion on the calling
/// thread. The emitter is `Clone` — clones share one registry — and
/// `Send + Sync`, with per-identifier locking inside the registry; no lock
/// is ever held while a handler runs.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use commutator_core::{Emitter, Handler, Publish, Subscribe};
///
/// let emitter = Emitter::<&str, u32>::new();
/// let seen = Arc::new(AtomicU32::new(0));
///
/// let counted = Arc::clone(&seen);
/// let sub = emitter.subscribe("tick", Handler::new(move |n: &u32| {
///     counted.fetch_add(*n, Ordering::SeqCst);
/// }));
///
/// emitter.publish(&"tick", &2);
/// sub.cancel();
/// emitter.publish(&"tick", &40);
///
/// assert_eq!(seen.load(Ordering::SeqCst), 2);
/// ```
pub struct Emitter<K, P> {
    registry: Arc<EventRegistry<K, P>>,
    config: Arc<EmitterConfig>,
}

impl<K: EventKey, P: EventPayload> Emitter<K, P> {
    /// Create an emitter with an empty registry and default configuration.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Create an emitter with custom configuration.
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            registry: Arc::new(EventRegistry::new()),
            config: Arc::new(config),
        }
    }

    /// Start building an emitter.
    pub fn builder() -> EmitterBuilder {
        EmitterBuilder::new()
    }

    /// Remove every registration and every identifier.
    pub fn clear(&self) {
        self.registry.clear();
        if self.config.enable_logging {
            debug!(label = self.config.label.as_deref(), "registry cleared");
        }
    }

    /// Number of handlers currently registered for `id`.
    pub fn handler_count(&self, id: &K) -> usize {
        self.registry.handler_count(id)
    }

    /// Current registry counts, for diagnostics.
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }
}

impl<K: EventKey, P: EventPayload> Default for Emitter<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Clone for Emitter<K, P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
        }
    }
}

impl<K: EventKey, P: EventPayload> EventTypes for Emitter<K, P> {
    type Key = K;
    type Payload = P;
}

impl<K: EventKey, P: EventPayload> Subscribe for Emitter<K, P> {
    fn subscribe(&self, id: K, handler: Handler<P>) -> Subscription {
        let registration = self.registry.append(id.clone(), handler);
        if self.config.enable_logging {
            debug!(
                event = ?id,
                registration = %registration,
                label = self.config.label.as_deref(),
                "handler subscribed"
            );
        }

        // The token closes over this specific registration. Removal by
        // registration id makes a second cancel a no-op, and the Weak
        // reference makes cancelling after the emitter is gone a no-op too.
        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove_registration(&id, registration);
            }
        })
    }

    fn unsubscribe(&self, id: &K, handler: &Handler<P>) {
        self.registry.remove_first(id, handler);
        if self.config.enable_logging {
            debug!(
                event = ?id,
                label = self.config.label.as_deref(),
                "handler unsubscribed"
            );
        }
    }

    fn unsubscribe_all(&self, id: &K) {
        self.registry.clear_event(id);
        if self.config.enable_logging {
            debug!(
                event = ?id,
                label = self.config.label.as_deref(),
                "all handlers unsubscribed"
            );
        }
    }
}

impl<K: EventKey, P: EventPayload> Publish for Emitter<K, P> {
    fn publish(&self, id: &K, payload: &P) {
        // Snapshot up front: handlers added or removed by a handler during
        // this publish never affect this publish's iteration.
        let snapshot = self.registry.snapshot(id);
        if self.config.enable_logging {
            trace!(
                event = ?id,
                handlers = snapshot.len(),
                label = self.config.label.as_deref(),
                "publishing"
            );
        }
        for registration in &snapshot {
            registration.handler.call(payload);
        }
    }
}

impl<K: EventKey, P: EventPayload> Inspect for Emitter<K, P> {
    fn registry(&self) -> &EventRegistry<K, P> {
        &self.registry
    }
}

impl<K: EventKey, P: EventPayload> Compose for Emitter<K, P> {}

/// Emitter builder.
pub struct EmitterBuilder {
    config: EmitterConfig,
}

impl EmitterBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: EmitterConfig::default(),
        }
    }

    /// Enable/disable logging.
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Label log lines with a name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    /// Build the emitter.
    pub fn build<K: EventKey, P: EventPayload>(self) -> Emitter<K, P> {
        Emitter::with_config(self.config)
    }
}

impl Default for EmitterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_handler(counter: &Arc<AtomicU32>) -> Handler<u32> {
        let counter = Arc::clone(counter);
        Handler::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn publish_invokes_in_registration_order() {
        let emitter = Emitter::<&str, u32>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&order);
        emitter.subscribe("save", Handler::new(move |_| seen.lock().unwrap().push("first")));
        let seen = Arc::clone(&order);
        emitter.subscribe("save", Handler::new(move |_| seen.lock().unwrap().push("second")));

        emitter.publish(&"save", &0);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn duplicate_registrations_fire_twice() {
        let emitter = Emitter::<&str, u32>::new();
        let calls = Arc::new(AtomicU32::new(0));
        let handler = counting_handler(&calls);

        emitter.subscribe("save", handler.clone());
        emitter.subscribe("save", handler);

        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancelling_twice_equals_cancelling_once() {
        let emitter = Emitter::<&str, u32>::new();
        let calls = Arc::new(AtomicU32::new(0));
        let handler = counting_handler(&calls);

        // The same handler registered twice; the token must remove only the
        // registration it closes over, however often it is cancelled.
        let first = emitter.subscribe("save", handler.clone());
        emitter.subscribe("save", handler);

        first.cancel();
        first.cancel();

        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_first_occurrence_only() {
        let emitter = Emitter::<&str, u32>::new();
        let calls = Arc::new(AtomicU32::new(0));
        let handler = counting_handler(&calls);

        emitter.subscribe("save", handler.clone());
        emitter.subscribe("save", handler.clone());

        emitter.unsubscribe(&"save", &handler);
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_unknown_is_a_noop() {
        let emitter = Emitter::<&str, u32>::new();
        let never_registered = Handler::new(|_| {});

        emitter.unsubscribe(&"save", &never_registered);
        emitter.unsubscribe_all(&"missing");
        emitter.publish(&"missing", &0);
    }

    #[test]
    fn unsubscribe_all_keeps_the_identifier_observable() {
        let emitter = Emitter::<&str, u32>::new();
        emitter.subscribe("save", Handler::new(|_| {}));

        emitter.unsubscribe_all(&"save");
        assert!(emitter.registry().contains(&"save"));
        assert_eq!(emitter.handler_count(&"save"), 0);
        assert!(!emitter.registry().contains(&"load"));
    }

    #[test]
    fn identifiers_are_never_case_normalized() {
        let emitter = Emitter::<String, u32>::new();
        let lower = Arc::new(AtomicU32::new(0));
        let upper = Arc::new(AtomicU32::new(0));

        emitter.subscribe("Foo".to_string(), counting_handler(&lower));
        emitter.subscribe("FOO".to_string(), counting_handler(&upper));

        emitter.publish(&"Foo".to_string(), &0);
        assert_eq!(lower.load(Ordering::SeqCst), 1);
        assert_eq!(upper.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn direct_registry_mutation_is_observed() {
        let emitter = Emitter::<&str, u32>::new();
        let calls = Arc::new(AtomicU32::new(0));
        let handler = counting_handler(&calls);

        // Seed the store directly, the way diagnostic tooling would.
        emitter.registry().append("save", handler.clone());
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        emitter.unsubscribe(&"save", &handler);
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handlers_added_during_publish_do_not_join_it() {
        let emitter = Emitter::<&str, u32>::new();
        let calls = Arc::new(AtomicU32::new(0));

        let reentrant = emitter.clone();
        let counter = Arc::clone(&calls);
        emitter.subscribe(
            "save",
            Handler::new(move |_| {
                let late = Arc::clone(&counter);
                reentrant.subscribe(
                    "save",
                    Handler::new(move |_| {
                        late.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelling_after_emitter_drop_is_a_noop() {
        let emitter = Emitter::<&str, u32>::new();
        let sub = emitter.subscribe("save", Handler::new(|_| {}));
        drop(emitter);
        sub.cancel();
    }

    #[test]
    fn builder_configures_the_emitter() {
        let emitter: Emitter<&str, u32> = Emitter::<&str, u32>::builder()
            .enable_logging(false)
            .label("inventory")
            .build();
        emitter.publish(&"save", &0);
    }
}
