//! One-shot subscriptions.

use std::sync::{Arc, OnceLock};

use commutator_core::registry::EventRegistry;
use commutator_core::{Compose, EventTypes, Handler, Inspect, Publish, Subscribe, Subscription};

use crate::batch::Batch;
use crate::watcher::{Watch, Watcher};

/// Capability: subscriptions that remove themselves after one delivery.
pub trait SubscribeOnce: EventTypes {
    /// Register `handler` for `id` so that it is invoked at most once, on
    /// the next publish of `id`. Returns the handler's own token; cancelling
    /// it before the event fires cancels the pending one-shot cleanly.
    fn once(&self, id: Self::Key, handler: Handler<Self::Payload>) -> Subscription;
}

/// Extension adding [`SubscribeOnce`] on top of any [`Subscribe`] layer.
///
/// Built with [`with_once`]. A one-shot is two ordinary registrations: the
/// handler itself, then a cleanup wrapper under the same identifier.
/// Because the wrapper is registered strictly after the handler, the handler
/// always runs before cleanup on the publish that consumes the one-shot.
#[derive(Clone)]
pub struct Once<E> {
    inner: E,
}

/// Wrap `inner` with one-shot support.
pub fn with_once<E: Subscribe>(inner: E) -> Once<E> {
    Once { inner }
}

impl<E: EventTypes> EventTypes for Once<E> {
    type Key = E::Key;
    type Payload = E::Payload;
}

impl<E: Subscribe> SubscribeOnce for Once<E> {
    fn once(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        let off = self.inner.subscribe(id.clone(), handler);

        // The wrapper needs its own token to remove itself, but the token
        // only exists once the wrapper is subscribed; it arrives via the
        // OnceLock. If the one-shot was cancelled early, the wrapper finds
        // nothing to remove and self-removes on the next publish of `id`.
        let own: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());
        let own_in_wrapper = Arc::clone(&own);
        let off_in_wrapper = off.clone();
        let wrapper = Handler::new(move |_: &E::Payload| {
            off_in_wrapper.cancel();
            if let Some(own) = own_in_wrapper.get() {
                own.cancel();
            }
        });

        let wrapper_off = self.inner.subscribe(id, wrapper);
        let _ = own.set(wrapper_off);

        off
    }
}

impl<E: Subscribe> Subscribe for Once<E> {
    fn subscribe(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        self.inner.subscribe(id, handler)
    }

    fn unsubscribe(&self, id: &E::Key, handler: &Handler<E::Payload>) {
        self.inner.unsubscribe(id, handler);
    }

    fn unsubscribe_all(&self, id: &E::Key) {
        self.inner.unsubscribe_all(id);
    }
}

impl<E: Publish> Publish for Once<E> {
    fn publish(&self, id: &E::Key, payload: &E::Payload) {
        self.inner.publish(id, payload);
    }
}

impl<E: Inspect> Inspect for Once<E> {
    fn registry(&self) -> &EventRegistry<E::Key, E::Payload> {
        self.inner.registry()
    }
}

impl<E: Watch> Watch for Once<E> {
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

impl<E: Batch> Batch for Once<E> {
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

impl<E> Compose for Once<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use commutator_core::Emitter;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_handler(counter: &Arc<AtomicU32>) -> Handler<u32> {
        let counter = Arc::clone(counter);
        Handler::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn handler_fires_exactly_once() {
        let emitter = Emitter::<&str, u32>::new().compose(with_once);
        let calls = Arc::new(AtomicU32::new(0));

        emitter.once("save", counting_handler(&calls));

        emitter.publish(&"save", &0);
        emitter.publish(&"save", &0);
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cleanup_runs_after_the_handler() {
        let emitter = Emitter::<&str, u32>::new().compose(with_once);
        let calls = Arc::new(AtomicU32::new(0));

        // If cleanup ran first, the handler would be gone before delivery.
        emitter.once("save", counting_handler(&calls));
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn early_cancel_prevents_delivery() {
        let emitter = Emitter::<&str, u32>::new().compose(with_once);
        let calls = Arc::new(AtomicU32::new(0));

        let sub = emitter.once("save", counting_handler(&calls));
        sub.cancel();

        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // The orphaned wrapper self-removed on the publish above.
        emitter.publish(&"save", &0);
        assert_eq!(emitter.registry().handler_count(&"save"), 0);
    }

    #[test]
    fn one_shots_do_not_disturb_plain_subscriptions() {
        let emitter = Emitter::<&str, u32>::new().compose(with_once);
        let plain = Arc::new(AtomicU32::new(0));
        let oneshot = Arc::new(AtomicU32::new(0));

        emitter.subscribe("save", counting_handler(&plain));
        emitter.once("save", counting_handler(&oneshot));

        emitter.publish(&"save", &0);
        emitter.publish(&"save", &0);
        assert_eq!(plain.load(Ordering::SeqCst), 2);
        assert_eq!(oneshot.load(Ordering::SeqCst), 1);
    }
}
