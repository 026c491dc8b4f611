//! Handler type with reference identity.

use std::fmt;
use std::sync::Arc;

use crate::key::EventPayload;

/// An event callback.
///
/// Handlers are cheap to clone; every clone refers to the same underlying
/// closure and counts as *the same handler* for identity purposes. Identity
/// matters in two places: removal by handler scans for the first occurrence
/// of this exact handler, and the duplicate-suppression extension treats a
/// re-registered clone as already present. Two separate [`Handler::new`]
/// calls always produce distinct handlers, even over identical code.
pub struct Handler<P> {
    f: Arc<dyn Fn(&P) + Send + Sync>,
}

impl<P: EventPayload> Handler<P> {
    /// Wrap a closure as a handler.
    pub fn new(f: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Invoke the handler with a payload.
    pub fn call(&self, payload: &P) {
        (self.f)(payload)
    }

    /// Whether `self` and `other` are clones of one handler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl<P> Clone for Handler<P> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<P> fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let handler = Handler::<u32>::new(|_| {});
        assert!(handler.ptr_eq(&handler.clone()));
    }

    #[test]
    fn separate_constructions_are_distinct() {
        let a = Handler::<u32>::new(|_| {});
        let b = Handler::<u32>::new(|_| {});
        assert!(!a.ptr_eq(&b));
    }
}
