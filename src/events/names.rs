//! Channel names shared with the native module and UI consumers.

/// Outgoing channel for hook-level events. Payloads are opaque.
pub const USE_UPDATES_EVENT: &str = "Expo.useUpdatesEvent";

/// Outgoing channel carrying adapted state-change records.
pub const STATE_CHANGE_EVENT: &str = "Expo.updatesStateChangeEvent";

/// Incoming native channel the adapter forwards from.
pub const NATIVE_STATE_CHANGE_EVENT: &str = "Expo.nativeUpdatesStateChangeEvent";
