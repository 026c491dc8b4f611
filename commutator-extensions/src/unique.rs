//! Duplicate-handler suppression.

use tracing::trace;

use commutator_core::registry::EventRegistry;
use commutator_core::{Compose, EventTypes, Handler, Inspect, Publish, Subscribe, Subscription};

use crate::batch::Batch;
use crate::once::SubscribeOnce;
use crate::watcher::{Watch, Watcher};

/// Extension making repeated subscription of the same `(id, handler)` pair
/// idempotent — a direct override of the core's duplicates-allowed default.
///
/// Built with [`with_unique_handlers`]. The check runs against the live
/// registry at call time, never a cached snapshot, so registrations made by
/// other layers or by direct registry manipulation are honored. A suppressed
/// subscribe returns [`Subscription::noop`] and registers nothing.
///
/// Note the check and the registration are two steps; under concurrent
/// subscription of the same pair from two threads, both may land. The
/// guarantee is per-thread idempotence.
#[derive(Clone)]
pub struct UniqueHandlers<E> {
    inner: E,
}

/// Wrap `inner` with duplicate suppression.
pub fn with_unique_handlers<E: Subscribe + Inspect>(inner: E) -> UniqueHandlers<E> {
    UniqueHandlers { inner }
}

impl<E: EventTypes> EventTypes for UniqueHandlers<E> {
    type Key = E::Key;
    type Payload = E::Payload;
}

impl<E: Subscribe + Inspect> Subscribe for UniqueHandlers<E> {
    fn subscribe(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        if self.inner.registry().is_registered(&id, &handler) {
            trace!(event = ?id, "duplicate subscription suppressed");
            return Subscription::noop();
        }
        self.inner.subscribe(id, handler)
    }

    fn unsubscribe(&self, id: &E::Key, handler: &Handler<E::Payload>) {
        self.inner.unsubscribe(id, handler);
    }

    fn unsubscribe_all(&self, id: &E::Key) {
        self.inner.unsubscribe_all(id);
    }
}

impl<E: Publish> Publish for UniqueHandlers<E> {
    fn publish(&self, id: &E::Key, payload: &E::Payload) {
        self.inner.publish(id, payload);
    }
}

impl<E: Inspect> Inspect for UniqueHandlers<E> {
    fn registry(&self) -> &EventRegistry<E::Key, E::Payload> {
        self.inner.registry()
    }
}

impl<E: SubscribeOnce> SubscribeOnce for UniqueHandlers<E> {
    fn once(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        self.inner.once(id, handler)
    }
}

impl<E: Watch> Watch for UniqueHandlers<E> {
    fn watch(&self, watcher: Watcher<E::Key, E::Payload>) -> Subscription {
        self.inner.watch(watcher)
    }

    fn unwatch(&self, watcher: &Watcher<E::Key, E::Payload>) {
        self.inner.unwatch(watcher);
    }

    fn unwatch_all(&self) {
        self.inner.unwatch_all();
    }
}

impl<E: Batch> Batch for UniqueHandlers<E> {
    fn batch(&self, id: E::Key, payload: E::Payload) {
        self.inner.batch(id, payload);
    }

    fn process_batch(&self) {
        self.inner.process_batch();
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }
}

impl<E> Compose for UniqueHandlers<E> {}
