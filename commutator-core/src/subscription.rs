//! Unsubscribe tokens.

use std::fmt;
use std::sync::Arc;

/// Cancellation token returned by every subscribe operation.
///
/// A subscription closes over one specific registration. Cancelling it
/// removes exactly that registration; cancelling again (or after the emitter
/// is gone) is a silent no-op. Tokens are cheap to clone — clones cancel the
/// same registration — which is what lets a [group] collect tokens from many
/// subscriptions and tear them all down at once.
///
/// [group]: https://docs.rs/commutator-extensions
#[derive(Clone)]
pub struct Subscription {
    cancel: Arc<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Build a token from a cancel closure. The closure must be idempotent.
    pub fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Arc::new(cancel),
        }
    }

    /// A token that cancels nothing.
    ///
    /// Returned by extensions that decline to register anything (the
    /// duplicate-suppression extension returns one for a repeated handler),
    /// so callers can treat every subscribe result uniformly.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Cancel the registration this token closes over.
    pub fn cancel(&self) {
        (self.cancel)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({:p})", Arc::as_ptr(&self.cancel))
    }
}
