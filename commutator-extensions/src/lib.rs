//! Composable subscription extensions for Commutator emitters.
//!
//! Each extension is a function from an emitter-shaped value to a wrapper
//! that adds or overrides capabilities, applied with
//! [`Compose::compose`](commutator_core::Compose::compose). Extensions are
//! independent of each other: every wrapper forwards the capabilities it
//! does not override, so a stack composes in any order and each layer sees
//! the others only through the capability traits.
//!
//! | Extension | Adds | Requires beneath it |
//! |---|---|---|
//! | [`with_once`] | one-shot subscriptions | `Subscribe` |
//! | [`with_watchers`] | catch-all observers | `Publish` |
//! | [`with_batching`] | deferred FIFO delivery | `Publish` |
//! | [`with_unique_handlers`] | duplicate suppression | `Subscribe` + `Inspect` |
//! | [`with_options`] | per-call options | `Subscribe` |
//! | [`with_groups`] | grouped bulk-unsubscription | `Subscribe` |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use commutator_core::{Compose, Emitter, Handler, Publish};
//! use commutator_extensions::{Group, with_groups, with_once, with_watchers};
//!
//! let emitter = Emitter::<&str, u32>::new()
//!     .compose(with_once)
//!     .compose(with_watchers)
//!     .compose(with_groups);
//!
//! let group = Group::new();
//! let seen = Arc::new(AtomicU32::new(0));
//!
//! let counter = Arc::clone(&seen);
//! emitter.subscribe_with(
//!     "tick",
//!     Handler::new(move |_| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }),
//!     (&group).into(),
//! );
//!
//! emitter.publish(&"tick", &1);
//! group.off();
//! emitter.publish(&"tick", &2);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

pub mod batch;
pub mod group;
pub mod once;
pub mod options;
pub mod unique;
pub mod watcher;

pub use batch::{Batch, Batching, with_batching};
pub use group::{Group, GroupOptions, assign_group, with_groups};
pub use once::{Once, SubscribeOnce, with_once};
pub use options::{Configurable, HandlerRef, OptionsContext, with_options};
pub use unique::{UniqueHandlers, with_unique_handlers};
pub use watcher::{Watch, Watcher, Watchers, with_watchers};
