//! Per-call subscription options.
//!
//! [`with_options`] generalizes subscription so each call may carry an
//! options value. The extension does not interpret options itself: after
//! performing the normal subscription it hands the value, together with an
//! [`OptionsContext`], to a caller-supplied options handler, which decides
//! what to do — file the token away for bulk cancellation, log, attach
//! metadata, anything. The group extension in [`crate::group`] is one
//! concrete options handler.
//!
//! Which operations gain an options-taking variant is decided at compile
//! time from the capabilities of the wrapped layer: `once_with` exists only
//! when the layer beneath exposes [`SubscribeOnce`], `watch_with` only when
//! it exposes [`Watch`]. A stack without those layers simply has no such
//! methods — never a broken surface.

use std::fmt;
use std::marker::PhantomData;

use commutator_core::registry::EventRegistry;
use commutator_core::{Compose, EventTypes, Handler, Inspect, Publish, Subscribe, Subscription};

use crate::batch::Batch;
use crate::once::SubscribeOnce;
use crate::watcher::{Watch, Watcher};

/// What a subscription-with-options call registered.
pub enum HandlerRef<K, P> {
    /// An identifier-specific handler.
    Event(Handler<P>),
    /// A catch-all watcher.
    Watcher(Watcher<K, P>),
}

impl<K, P> Clone for HandlerRef<K, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Event(handler) => Self::Event(handler.clone()),
            Self::Watcher(watcher) => Self::Watcher(watcher.clone()),
        }
    }
}

impl<K, P> fmt::Debug for HandlerRef<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(handler) => f.debug_tuple("Event").field(handler).finish(),
            Self::Watcher(watcher) => f.debug_tuple("Watcher").field(watcher).finish(),
        }
    }
}

/// Everything an options handler may act on for one subscription.
pub struct OptionsContext<E: EventTypes> {
    /// The event identifier, absent for watcher registrations.
    pub id: Option<E::Key>,
    /// The handler or watcher that was registered.
    pub handler: HandlerRef<E::Key, E::Payload>,
    /// A handle to the wrapped emitter layer (clones share its state).
    pub emitter: E,
    /// The registration's cancellation token.
    pub off: Subscription,
}

/// Extension generalizing subscription to accept per-call options.
///
/// Built with [`with_options`]. Plain [`Subscribe`] (and [`SubscribeOnce`],
/// [`Watch`]) pass through untouched; the `*_with` variants invoke the
/// options handler synchronously after subscribing.
pub struct Configurable<E, O, H> {
    inner: E,
    on_options: H,
    _options: PhantomData<fn(&O)>,
}

/// Build an options extension around `on_options`.
///
/// Returns the extension function itself, ready for
/// [`compose`](Compose::compose):
///
/// ```rust
/// use commutator_core::{Compose, Emitter, EventTypes, Handler};
/// use commutator_extensions::{OptionsContext, with_options};
///
/// #[derive(Debug)]
/// struct Tag(&'static str);
///
/// fn log_tag<E: EventTypes>(options: &Tag, _context: OptionsContext<E>) {
///     println!("subscribed with tag {:?}", options.0);
/// }
///
/// let emitter = Emitter::<&str, u32>::new().compose(with_options(log_tag));
/// emitter.subscribe_with("save", Handler::new(|_| {}), Tag("audit"));
/// ```
pub fn with_options<E, O, H>(on_options: H) -> impl FnOnce(E) -> Configurable<E, O, H>
where
    E: Subscribe + Clone,
    H: Fn(&O, OptionsContext<E>),
{
    move |inner| Configurable {
        inner,
        on_options,
        _options: PhantomData,
    }
}

impl<E, O, H> Configurable<E, O, H>
where
    E: Subscribe + Clone,
    H: Fn(&O, OptionsContext<E>),
{
    /// Subscribe, then hand `options` to the options handler.
    pub fn subscribe_with(
        &self,
        id: E::Key,
        handler: Handler<E::Payload>,
        options: O,
    ) -> Subscription {
        let off = self.inner.subscribe(id.clone(), handler.clone());
        (self.on_options)(
            &options,
            OptionsContext {
                id: Some(id),
                handler: HandlerRef::Event(handler),
                emitter: self.inner.clone(),
                off: off.clone(),
            },
        );
        off
    }
}

impl<E, O, H> Configurable<E, O, H>
where
    E: Subscribe + SubscribeOnce + Clone,
    H: Fn(&O, OptionsContext<E>),
{
    /// One-shot subscribe, then hand `options` to the options handler.
    /// Present only when the wrapped layer supports one-shots.
    pub fn once_with(
        &self,
        id: E::Key,
        handler: Handler<E::Payload>,
        options: O,
    ) -> Subscription {
        let off = self.inner.once(id.clone(), handler.clone());
        (self.on_options)(
            &options,
            OptionsContext {
                id: Some(id),
                handler: HandlerRef::Event(handler),
                emitter: self.inner.clone(),
                off: off.clone(),
            },
        );
        off
    }
}

impl<E, O, H> Configurable<E, O, H>
where
    E: Subscribe + Watch + Clone,
    H: Fn(&O, OptionsContext<E>),
{
    /// Watch, then hand `options` to the options handler. Present only when
    /// the wrapped layer supports watchers.
    pub fn watch_with(
        &self,
        watcher: Watcher<E::Key, E::Payload>,
        options: O,
    ) -> Subscription {
        let off = self.inner.watch(watcher.clone());
        (self.on_options)(
            &options,
            OptionsContext {
                id: None,
                handler: HandlerRef::Watcher(watcher),
                emitter: self.inner.clone(),
                off: off.clone(),
            },
        );
        off
    }
}

impl<E: Clone, O, H: Clone> Clone for Configurable<E, O, H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            on_options: self.on_options.clone(),
            _options: PhantomData,
        }
    }
}

impl<E: EventTypes, O, H> EventTypes for Configurable<E, O, H> {
    type Key = E::Key;
    type Payload = E::Payload;
}

impl<E: Subscribe, O, H> Subscribe for Configurable<E, O, H> {
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

impl<E: Publish, O, H> Publish for Configurable<E, O, H> {
    fn publish(&self, id: &E::Key, payload: &E::Payload) {
        self.inner.publish(id, payload);
    }
}

impl<E: Inspect, O, H> Inspect for Configurable<E, O, H> {
    fn registry(&self) -> &EventRegistry<E::Key, E::Payload> {
        self.inner.registry()
    }
}

impl<E: SubscribeOnce, O, H> SubscribeOnce for Configurable<E, O, H> {
    fn once(&self, id: E::Key, handler: Handler<E::Payload>) -> Subscription {
        self.inner.once(id, handler)
    }
}

impl<E: Watch, O, H> Watch for Configurable<E, O, H> {
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

impl<E: Batch, O, H> Batch for Configurable<E, O, H> {
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

impl<E, O, H> Compose for Configurable<E, O, H> {}
