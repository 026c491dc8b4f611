// Commutator - a typed in-process publish/subscribe core with composable
// extensions.
//
// This library provides a minimal emitter plus a composition mechanism that
// layers additional subscription semantics onto it without modifying it.

// Re-export core functionality
pub use commutator_core::*;

// Re-export optional crates
#[cfg(feature = "extensions")]
pub use commutator_extensions;

#[cfg(feature = "extensions")]
pub use commutator_extensions::{
    Batch, Batching, Configurable, Group, GroupOptions, HandlerRef, Once, OptionsContext,
    SubscribeOnce, UniqueHandlers, Watch, Watcher, Watchers, assign_group, with_batching,
    with_groups, with_once, with_options, with_unique_handlers, with_watchers,
};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Compose,
        Emitter,
        EmitterBuilder,
        EmitterConfig,
        EventKey,
        EventPayload,
        EventToken,
        EventTypes,
        Handler,
        Inspect,
        Publish,
        Subscribe,
        Subscription,
    };

    #[cfg(feature = "extensions")]
    pub use crate::{
        Batch,
        Group,
        GroupOptions,
        SubscribeOnce,
        Watch,
        Watcher,
        with_batching,
        with_groups,
        with_once,
        with_options,
        with_unique_handlers,
        with_watchers,
    };
}
