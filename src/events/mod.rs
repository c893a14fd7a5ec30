//! Event infrastructure — channel names, payload types, and native event adaptation.

pub mod names;
pub mod state_change;
pub mod types;

pub use names::{NATIVE_STATE_CHANGE_EVENT, STATE_CHANGE_EVENT, USE_UPDATES_EVENT};
pub use state_change::adapt_state_change;
pub use types::{UpdatesContext, UpdatesStateChangeEvent, UseUpdatesEvent};
