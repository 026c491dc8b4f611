//! Deferred, batched delivery.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use commutator_core::registry::EventRegistry;
use commutator_core::{Compose, EventTypes, Handler, Inspect, Publish, Subscribe, Subscription};

use crate::once::SubscribeOnce;
use crate::watcher::{Watch, Watcher};

/// One queued publish.
struct BatchEntry<K, P> {
    id: K,
    payload: P,
    enqueued_at: DateTime<Utc>,
}

/// Capability: queue publishes and replay them later.
pub trait Batch: EventTypes {
    /// Queue `(id, payload)` without invoking any handler.
    fn batch(&self, id: Self::Key, payload: Self::Payload);

    /// Replay every queued entry through the wrapped publish, in FIFO
    /// order, then leave the queue holding only entries enqueued during the
    /// replay itself.
    fn process_batch(&self);

    /// Number of entries currently queued.
    fn pending(&self) -> usize;
}

/// Extension adding [`Batch`] on top of any [`Publish`] layer.
///
/// Built with [`with_batching`]. The queue is swapped out before replay
/// begins, so a handler that batches during the replay enqueues for the
/// *next* `process_batch` call, never the one in progress.
pub struct Batching<E: EventTypes> {
    inner: E,
    queue: Arc<Mutex<Vec<BatchEntry<E::Key, E::Payload>>>>,
}

/// Wrap `inner` with deferred delivery support.
pub fn with_batching<E: Publish>(inner: E) -> Batching<E> {
    Batching {
        inner,
        queue: Arc::new(Mutex::new(Vec::new())),
    }
}

impl<E: EventTypes + Clone> Clone for Batching<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<E: EventTypes> EventTypes for Batching<E> {
    type Key = E::Key;
    type Payload = E::Payload;
}

impl<E: Publish> Batch for Batching<E> {
    fn batch(&self, id: E::Key, payload: E::Payload) {
        trace!(event = ?id, "publish queued");
        self.queue.lock().unwrap().push(BatchEntry {
            id,
            payload,
            enqueued_at: Utc::now(),
        });
    }

    fn process_batch(&self) {
        let drained = {
            let mut queue = self.queue.lock().unwrap();
            std::mem::take(&mut *queue)
        };
        if drained.is_empty() {
            return;
        }

        debug!(entries = drained.len(), "replaying batch");
        for entry in &drained {
            trace!(
                event = ?entry.id,
                queued_ms = (Utc::now() - entry.enqueued_at).num_milliseconds(),
                "replaying entry"
            );
            self.inner.publish(&entry.id, &entry.payload);
        }
    }

    fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl<E: Publish> Publish for Batching<E> {
    fn publish(&self, id: &E::Key, payload: &E::Payload) {
        self.inner.publish(id, payload);
    }
}

impl<E: Subscribe> Subscribe for Batching<E> {
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

impl<E: Inspect> Inspect for Batching<E> {
    fn registry(&self) -> &EventRegistry<E::Key, E::Payload> {
        self.inner.registry()
    }
}

impl<E: SubscribeOnce> SubscribeOnce for Batching<E> {
    fn once(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        self.inner.once(id, handler)
    }
}

impl<E: Watch> Watch for Batching<E> {
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

impl<E: EventTypes> Compose for Batching<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use commutator_core::Emitter;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn nothing_fires_before_process_batch() {
        let emitter = Emitter::<&str, u32>::new().compose(with_batching);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        emitter.subscribe(
            "save",
            Handler::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        emitter.batch("save", 1);
        emitter.batch("save", 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(emitter.pending(), 2);

        emitter.process_batch();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(emitter.pending(), 0);
    }

    #[test]
    fn replay_is_fifo() {
        let emitter = Emitter::<&str, u32>::new().compose(with_batching);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        emitter.subscribe(
            "save",
            Handler::new(move |payload: &u32| {
                log.lock().unwrap().push(*payload);
            }),
        );

        emitter.batch("save", 1);
        emitter.batch("save", 2);
        emitter.batch("save", 3);
        emitter.process_batch();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn entries_batched_during_replay_wait_for_the_next_call() {
        let emitter = Emitter::<&str, u32>::new().compose(with_batching);
        let calls = Arc::new(AtomicU32::new(0));

        let reentrant = emitter.clone();
        let counter = Arc::clone(&calls);
        emitter.subscribe(
            "save",
            Handler::new(move |payload: &u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                if *payload == 1 {
                    reentrant.batch("save", 99);
                }
            }),
        );

        emitter.batch("save", 1);
        emitter.process_batch();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.pending(), 1);

        emitter.process_batch();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(emitter.pending(), 0);
    }

    #[test]
    fn direct_publish_bypasses_the_queue() {
        let emitter = Emitter::<&str, u32>::new().compose(with_batching);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        emitter.subscribe(
            "save",
            Handler::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.pending(), 0);
    }
}
