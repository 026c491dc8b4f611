//! Catch-all observers.

use std::fmt;
use std::sync::{Arc, Mutex};

use commutator_core::registry::EventRegistry;
use commutator_core::{
    Compose, EventKey, EventPayload, EventTypes, Handler, Inspect, Publish, Subscribe,
    Subscription,
};

use crate::batch::Batch;
use crate::once::SubscribeOnce;

/// A catch-all callback, invoked with `(identifier, payload)` once per
/// publish, whatever the identifier. Clones share identity, like
/// [`Handler`].
pub struct Watcher<K, P> {
    f: Arc<dyn Fn(&K, &P) + Send + Sync>,
}

impl<K: EventKey, P: EventPayload> Watcher<K, P> {
    /// Wrap a closure as a watcher.
    pub fn new(f: impl Fn(&K, &P) + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Invoke the watcher.
    pub fn call(&self, id: &K, payload: &P) {
        (self.f)(id, payload)
    }

    /// Whether `self` and `other` are clones of one watcher.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl<K, P> Clone for Watcher<K, P> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<K, P> fmt::Debug for Watcher<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Watcher({:p})", Arc::as_ptr(&self.f))
    }
}

/// Capability: observe every publish.
pub trait Watch: EventTypes {
    /// Register a watcher. At most one membership per watcher identity; the
    /// returned token removes it.
    fn watch(&self, watcher: Watcher<Self::Key, Self::Payload>) -> Subscription;

    /// Remove one watcher by identity. Silent no-op if absent.
    fn unwatch(&self, watcher: &Watcher<Self::Key, Self::Payload>);

    /// Remove every watcher.
    fn unwatch_all(&self);
}

/// Extension adding [`Watch`] on top of any [`Publish`] layer.
///
/// Built with [`with_watchers`]. The watcher store is independent of the
/// registry and unordered — no ordering guarantee exists among watchers.
/// Publish is replaced: the wrapped publish runs first, so identifier-
/// specific handlers always precede watchers for the same publish call.
pub struct Watchers<E: EventTypes> {
    inner: E,
    watchers: Arc<Mutex<Vec<Watcher<E::Key, E::Payload>>>>,
}

/// Wrap `inner` with catch-all observer support.
pub fn with_watchers<E: Publish>(inner: E) -> Watchers<E> {
    Watchers {
        inner,
        watchers: Arc::new(Mutex::new(Vec::new())),
    }
}

impl<E: EventTypes + Clone> Clone for Watchers<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            watchers: Arc::clone(&self.watchers),
        }
    }
}

impl<E: EventTypes> EventTypes for Watchers<E> {
    type Key = E::Key;
    type Payload = E::Payload;
}

impl<E: Publish> Watch for Watchers<E> {
    fn watch(&self, watcher: Watcher<E::Key, E::Payload>) -> Subscription {
        {
            let mut watchers = self.watchers.lock().unwrap();
            if !watchers.iter().any(|w| w.ptr_eq(&watcher)) {
                watchers.push(watcher.clone());
            }
        }

        let store = Arc::downgrade(&self.watchers);
        Subscription::new(move || {
            if let Some(store) = store.upgrade() {
                remove_watcher(&store, &watcher);
            }
        })
    }

    fn unwatch(&self, watcher: &Watcher<E::Key, E::Payload>) {
        remove_watcher(&self.watchers, watcher);
    }

    fn unwatch_all(&self) {
        self.watchers.lock().unwrap().clear();
    }
}

fn remove_watcher<K: EventKey, P: EventPayload>(
    store: &Arc<Mutex<Vec<Watcher<K, P>>>>,
    watcher: &Watcher<K, P>,
) {
    let mut watchers = store.lock().unwrap();
    if let Some(pos) = watchers.iter().position(|w| w.ptr_eq(watcher)) {
        watchers.remove(pos);
    }
}

impl<E: Publish> Publish for Watchers<E> {
    fn publish(&self, id: &E::Key, payload: &E::Payload) {
        self.inner.publish(id, payload);

        // Snapshot outside the lock, so a watcher that watches or unwatches
        // during delivery neither deadlocks nor affects this publish.
        let snapshot: Vec<_> = self.watchers.lock().unwrap().clone();
        for watcher in &snapshot {
            watcher.call(id, payload);
        }
    }
}

impl<E: Subscribe> Subscribe for Watchers<E> {
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

impl<E: Inspect> Inspect for Watchers<E> {
    fn registry(&self) -> &EventRegistry<E::Key, E::Payload> {
        self.inner.registry()
    }
}

impl<E: SubscribeOnce> SubscribeOnce for Watchers<E> {
    fn once(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        self.inner.once(id, handler)
    }
}

impl<E: Batch> Batch for Watchers<E> {
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

impl<E: EventTypes> Compose for Watchers<E> {}
