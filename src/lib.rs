//! # Updates Emitter - native update state events for UI hooks
//!
//! Re-emits the native module's update state-change stream on an in-process
//! publish/subscribe bus:
//! - Lazily created process-wide bus with named channels
//! - State-change adaptation (manifest strings parsed into JSON values)
//! - Typed subscribe/emit functions for hook and state-change events
//! - A hook binding that follows a component's mount/unmount
//!
//! ## Flow
//!
//! ```text
//!   native module ─► native channel ─► adapter ─► bus ─► listeners
//!   (Expo.nativeUpdatesStateChangeEvent)    (Expo.updatesStateChangeEvent,
//!                                            Expo.useUpdatesEvent)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod bus;
pub mod emitter;
pub mod events;
pub mod hook;
pub mod native;
pub mod types;

// Internal utilities
pub mod observability;

pub use bus::{BusStats, EventBus, Subscription};
pub use emitter::{
    emit_state_change_event, emit_use_updates_event, get_bus, handle_native_state_change_event,
    subscribe_to_state_change_event, subscribe_to_use_updates_event, UpdatesEmitter,
};
pub use events::{UpdatesContext, UpdatesStateChangeEvent, UseUpdatesEvent};
pub use hook::{use_update_events, UpdateEventsHook};
pub use native::{native_events, pump_native_events};
pub use types::{Config, Error, Result};
