//! Typed publish/subscribe core for Commutator.
//!
//! This crate provides the minimal emitter — a registry of ordered handler
//! lists plus the three primitive operations (subscribe, unsubscribe,
//! publish) — and the composition point that extension crates build on.
//!
//! ## Features
//!
//! - **Typed** - Handler signatures are checked against the payload type at
//!   compile time; the runtime performs no validation
//! - **Synchronous** - Every operation runs to completion on the calling
//!   thread, in registration order
//! - **No failure modes** - Unknown identifiers, repeated cancels and empty
//!   publishes are silent no-ops
//! - **Composable** - Capability traits plus [`Compose`] let independently
//!   authored extensions wrap an emitter without it knowing about them
//! - **Inspectable** - The live registry is a public read/write surface
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use commutator_core::{Emitter, Handler, Publish, Subscribe};
//!
//! #[derive(Debug)]
//! struct OrderPlaced {
//!     order_id: u64,
//! }
//!
//! let emitter = Emitter::<&str, OrderPlaced>::new();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let seen = Arc::clone(&log);
//! let sub = emitter.subscribe("order_placed", Handler::new(move |event: &OrderPlaced| {
//!     seen.lock().unwrap().push(event.order_id);
//! }));
//!
//! emitter.publish(&"order_placed", &OrderPlaced { order_id: 7 });
//! assert_eq!(*log.lock().unwrap(), vec![7]);
//!
//! sub.cancel();
//! emitter.publish(&"order_placed", &OrderPlaced { order_id: 8 });
//! assert_eq!(*log.lock().unwrap(), vec![7]);
//! ```
//!
//! ## Composition
//!
//! Extensions are plain functions from one emitter shape to another, applied
//! with [`Compose::compose`]:
//!
//! ```rust,ignore
//! let emitter = Emitter::<&str, u32>::new()
//!     .compose(with_once)
//!     .compose(with_watchers);
//! ```
//!
//! Each layer performs its own bookkeeping and delegates to the wrapped
//! layer's primitives; capabilities a layer does not override are forwarded,
//! so the whole stack stays visible from the outside.

pub mod compose;
pub mod emitter;
pub mod handler;
pub mod key;
pub mod registry;
pub mod subscription;
pub mod traits;

pub use compose::Compose;
pub use emitter::{Emitter, EmitterBuilder, EmitterConfig};
pub use handler::Handler;
pub use key::{EventKey, EventPayload, EventToken};
pub use registry::{EventRegistry, Registration, RegistrationId, RegistryStats};
pub use subscription::Subscription;
pub use traits::{EventTypes, Inspect, Publish, Subscribe};
