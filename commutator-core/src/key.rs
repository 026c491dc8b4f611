//! Event key and payload bounds, plus the opaque [`EventToken`] key type.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bounds required of an event identifier.
///
/// Blanket-implemented: strings, integers, enums and [`EventToken`] all
/// qualify. Identifiers are compared by exact equality — no normalization
/// (case, whitespace) is ever applied, so `"Foo"` and `"FOO"` address two
/// unrelated event classes.
pub trait EventKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> EventKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Bounds required of an event payload.
pub trait EventPayload: Send + Sync + 'static {}

impl<T> EventPayload for T where T: Send + Sync + 'static {}

/// Opaque event key.
///
/// Useful when an event class should be addressable only through a value the
/// creating module hands out, never through a guessable name. Two tokens
/// compare equal only if one is a copy of the other.
///
/// # Examples
///
/// ```
/// use commutator_core::EventToken;
///
/// let shutdown = EventToken::new();
/// assert_eq!(shutdown, shutdown);
/// assert_ne!(shutdown, EventToken::new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventToken(Uuid);

impl EventToken {
    /// Create a fresh token, distinct from every existing one.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(EventToken::new(), EventToken::new());
    }

    #[test]
    fn copies_compare_equal() {
        let token = EventToken::new();
        let copy = token;
        assert_eq!(token, copy);
    }
}
