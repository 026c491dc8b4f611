//! Capability traits.
//!
//! Every emitter-shaped object — the core [`Emitter`](crate::Emitter) and
//! each extension wrapper around it — advertises what it can do through
//! these traits. Extensions depend only on the minimal capability set they
//! need (`Subscribe`, `Publish`, or registry access via `Inspect`) and may
//! not assume they are the outermost or innermost layer of a stack. A
//! wrapper forwards every capability it does not override, so capabilities
//! added low in a stack remain visible at the top.

use crate::handler::Handler;
use crate::key::{EventKey, EventPayload};
use crate::registry::EventRegistry;
use crate::subscription::Subscription;

/// The key/payload vocabulary of an emitter.
///
/// Declared once per emitter type; the capability traits below share it, so
/// a stack of wrappers has one unambiguous `Key` and `Payload` throughout.
pub trait EventTypes {
    /// Event identifier type.
    type Key: EventKey;
    /// Payload type delivered to handlers.
    type Payload: EventPayload;
}

/// Capability: register and remove handlers.
pub trait Subscribe: EventTypes {
    /// Append `handler` to the list for `id`. Returns a token that removes
    /// exactly this registration. Never fails; any identifier and handler
    /// are accepted.
    fn subscribe(&self, id: Self::Key, handler: Handler<Self::Payload>) -> Subscription;

    /// Remove the first occurrence of `handler` under `id`, by identity.
    /// Silent no-op if nothing matches.
    fn unsubscribe(&self, id: &Self::Key, handler: &Handler<Self::Payload>);

    /// Remove every handler under `id`, keeping the identifier observable.
    /// Silent no-op if `id` was never subscribed to.
    fn unsubscribe_all(&self, id: &Self::Key);
}

/// Capability: deliver a payload to an identifier's handlers.
pub trait Publish: EventTypes {
    /// Invoke every handler currently registered for `id`, in registration
    /// order, synchronously on the calling thread. Publishing to an
    /// identifier with no subscribers is a silent no-op.
    fn publish(&self, id: &Self::Key, payload: &Self::Payload);
}

/// Capability: read the live registry behind an emitter.
pub trait Inspect: EventTypes {
    /// The shared registration store. This is the emitter's own backing
    /// state, not a copy — mutations through it are immediately visible to
    /// publish and unsubscribe.
    fn registry(&self) -> &EventRegistry<Self::Key, Self::Payload>;
}
