//! The extension point.

/// Composition primitive all extensions build on.
///
/// An extension is any function from an emitter-shaped value to a new value
/// — usually a wrapper that adds or overrides capabilities. `compose` just
/// applies it and hands back whatever it produced, so chains read in
/// application order: `emitter.compose(a).compose(b)` applies `a`, then `b`
/// to `a`'s output.
///
/// # Examples
///
/// ```
/// use commutator_core::{Compose, Emitter};
///
/// fn with_nothing<E>(inner: E) -> E {
///     inner
/// }
///
/// let emitter = Emitter::<&str, u32>::new().compose(with_nothing);
/// # let _ = emitter;
/// ```
pub trait Compose: Sized {
    /// Apply `extension` to this emitter and return its output.
    fn compose<X, F>(self, extension: F) -> X
    where
        F: FnOnce(Self) -> X,
    {
        extension(self)
    }
}
