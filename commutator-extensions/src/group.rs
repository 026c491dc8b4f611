//! Grouped bulk-unsubscription.

use std::sync::{Arc, Mutex};

use tracing::debug;

use commutator_core::{EventTypes, Subscribe, Subscription};

use crate::options::{Configurable, OptionsContext, with_options};

/// A set of cancellation tokens torn down as one unit.
///
/// Groups own the tokens they collect, never the registry — a group holds no
/// reference to any emitter, so one group can span subscriptions across many
/// emitters. [`off`](Self::off) cancels every collected token; since each
/// token is individually idempotent, calling `off` again is a safe no-op,
/// and the group stays inspectable afterwards.
///
/// Clones share the same token set.
#[derive(Clone, Default)]
pub struct Group {
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token to the group.
    pub fn add(&self, subscription: Subscription) {
        self.subscriptions.lock().unwrap().push(subscription);
    }

    /// Cancel every collected token, in no particular order.
    pub fn off(&self) {
        let snapshot: Vec<_> = self.subscriptions.lock().unwrap().clone();
        debug!(subscriptions = snapshot.len(), "cancelling group");
        for subscription in &snapshot {
            subscription.cancel();
        }
    }

    /// Number of tokens collected so far.
    pub fn len(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }

    /// Whether the group has collected any tokens.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().unwrap().is_empty()
    }
}

/// Options recognized by [`assign_group`].
#[derive(Clone, Default)]
pub struct GroupOptions {
    /// The group that should collect this subscription's token, if any.
    pub group: Option<Group>,
}

impl From<Group> for GroupOptions {
    fn from(group: Group) -> Self {
        Self { group: Some(group) }
    }
}

impl From<&Group> for GroupOptions {
    fn from(group: &Group) -> Self {
        Self {
            group: Some(group.clone()),
        }
    }
}

/// The group options handler: files the subscription's token into the group
/// carried by the options, when one is present.
pub fn assign_group<E: EventTypes>(options: &GroupOptions, context: OptionsContext<E>) {
    if let Some(group) = &options.group {
        group.add(context.off.clone());
    }
}

/// Wrap `inner` so subscriptions can join a [`Group`] per call.
///
/// Shorthand for `with_options(assign_group)`, usable directly with
/// [`compose`](commutator_core::Compose::compose).
pub fn with_groups<E>(
    inner: E,
) -> Configurable<E, GroupOptions, fn(&GroupOptions, OptionsContext<E>)>
where
    E: Subscribe + Clone,
{
    with_options(assign_group::<E> as fn(&GroupOptions, OptionsContext<E>))(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use commutator_core::{Compose, Emitter, Handler, Publish};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_handler(counter: &Arc<AtomicU32>) -> Handler<u32> {
        let counter = Arc::clone(counter);
        Handler::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn group_off_cancels_every_member() {
        let emitter = Emitter::<&str, u32>::new().compose(with_groups);
        let group = Group::new();
        let grouped = Arc::new(AtomicU32::new(0));
        let ungrouped = Arc::new(AtomicU32::new(0));

        emitter.subscribe_with("save", counting_handler(&grouped), (&group).into());
        emitter.subscribe_with("load", counting_handler(&grouped), (&group).into());
        emitter.subscribe("save", counting_handler(&ungrouped));

        group.off();
        emitter.publish(&"save", &0);
        emitter.publish(&"load", &0);

        assert_eq!(grouped.load(Ordering::SeqCst), 0);
        assert_eq!(ungrouped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_twice_is_a_noop() {
        let emitter = Emitter::<&str, u32>::new().compose(with_groups);
        let group = Group::new();
        let calls = Arc::new(AtomicU32::new(0));

        emitter.subscribe_with("save", counting_handler(&calls), (&group).into());

        group.off();
        group.off();
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn group_stays_inspectable_after_off() {
        let emitter = Emitter::<&str, u32>::new().compose(with_groups);
        let group = Group::new();

        emitter.subscribe_with("save", Handler::new(|_| {}), (&group).into());
        emitter.subscribe_with("load", Handler::new(|_| {}), (&group).into());
        assert_eq!(group.len(), 2);

        group.off();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn options_without_a_group_register_normally() {
        let emitter = Emitter::<&str, u32>::new().compose(with_groups);
        let calls = Arc::new(AtomicU32::new(0));

        emitter.subscribe_with("save", counting_handler(&calls), GroupOptions::default());
        emitter.publish(&"save", &0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
