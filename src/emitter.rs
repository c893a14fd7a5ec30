//! Process-wide updates emitter.
//!
//! Owns the lazily created bus behind the public subscribe/emit API. The bus
//! exists from the first subscription onward and is never torn down; creating
//! it also attaches the single forwarding listener on the native channel.
//! Emitting before that point is a usage error.

use crate::bus::{EventBus, Subscription};
use crate::events::{
    adapt_state_change, UpdatesStateChangeEvent, UseUpdatesEvent, NATIVE_STATE_CHANGE_EVENT,
    STATE_CHANGE_EVENT, USE_UPDATES_EVENT,
};
use crate::native::native_events;
use crate::types::{BusConfig, Config, Error, Result};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;

static UPDATES_EMITTER: OnceLock<UpdatesEmitter> = OnceLock::new();

/// The process-wide emitter, bound to [`native_events`].
pub fn global() -> &'static UpdatesEmitter {
    UPDATES_EMITTER.get_or_init(|| {
        UpdatesEmitter::new(Arc::clone(native_events()), Config::from_env().bus)
    })
}

/// Lazily initialized bus plus the native channel it forwards from.
#[derive(Debug)]
pub struct UpdatesEmitter {
    bus: OnceLock<Arc<EventBus>>,
    native: Arc<EventBus>,
    config: BusConfig,
}

impl UpdatesEmitter {
    pub(crate) fn new(native: Arc<EventBus>, config: BusConfig) -> Self {
        Self {
            bus: OnceLock::new(),
            native,
            config,
        }
    }

    /// Return the bus, creating it and registering the native forwarder on
    /// first use. Safe under concurrent first use.
    pub fn get_bus(&self) -> &Arc<EventBus> {
        self.bus.get_or_init(|| {
            let bus = Arc::new(EventBus::new(self.config));
            let forward_to = Arc::clone(&bus);
            // Never removed: the forwarder lives as long as the process.
            let _forwarder = self.native.subscribe(NATIVE_STATE_CHANGE_EVENT, move |payload| {
                match forward_state_change(&forward_to, payload) {
                    Ok(_) => {}
                    Err(err) if err.is_payload_error() => {
                        tracing::warn!("Dropped native state change event: {}", err);
                    }
                    Err(err) => tracing::error!("Dropped native state change event: {}", err),
                }
            });
            tracing::debug!("Updates bus created, forwarding {}", NATIVE_STATE_CHANGE_EVENT);
            bus
        })
    }

    /// Whether the bus has been created.
    pub fn is_initialized(&self) -> bool {
        self.bus.get().is_some()
    }

    fn initialized_bus(&self) -> Result<&Arc<EventBus>> {
        self.bus.get().ok_or(Error::BusNotInitialized)
    }

    // =========================================================================
    // Generic channels
    // =========================================================================

    pub fn subscribe<F>(&self, event_name: &str, listener: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.get_bus().subscribe(event_name, listener)
    }

    pub fn subscribe_channel(
        &self,
        event_name: &str,
    ) -> (Subscription, mpsc::UnboundedReceiver<Value>) {
        self.get_bus().subscribe_channel(event_name)
    }

    /// Emit on an existing bus. Fails with [`Error::BusNotInitialized`] if no
    /// subscription has created it yet.
    pub fn emit(&self, event_name: &str, payload: &Value) -> Result<usize> {
        Ok(self.initialized_bus()?.emit(event_name, payload))
    }

    // =========================================================================
    // Typed channels
    // =========================================================================

    pub fn subscribe_to_use_updates_event<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&UseUpdatesEvent) + Send + Sync + 'static,
    {
        self.subscribe(USE_UPDATES_EVENT, listener)
    }

    pub fn emit_use_updates_event(&self, event: &UseUpdatesEvent) -> Result<usize> {
        self.emit(USE_UPDATES_EVENT, event)
    }

    /// Payloads on the state-change channel that do not decode are skipped
    /// for this listener with a warning.
    pub fn subscribe_to_state_change_event<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&UpdatesStateChangeEvent) + Send + Sync + 'static,
    {
        self.subscribe(STATE_CHANGE_EVENT, move |payload| {
            match UpdatesStateChangeEvent::from_value(payload.clone()) {
                Ok(event) => listener(&event),
                Err(err) => tracing::warn!("Skipping undecodable state change event: {}", err),
            }
        })
    }

    /// Push an already adapted event, bypassing native payload parsing.
    pub fn emit_state_change_event(&self, event: &UpdatesStateChangeEvent) -> Result<usize> {
        let bus = self.initialized_bus()?;
        Ok(bus.emit(STATE_CHANGE_EVENT, &event.to_value()?))
    }

    /// Adapt a raw native payload and emit it on the state-change channel.
    ///
    /// Adaptation errors are returned before the bus is checked.
    pub fn handle_native_state_change_event(&self, payload: &Value) -> Result<usize> {
        let event = adapt_state_change(payload)?;
        let bus = self.initialized_bus()?;
        Ok(bus.emit(STATE_CHANGE_EVENT, &event.to_value()?))
    }
}

fn forward_state_change(bus: &EventBus, payload: &Value) -> Result<usize> {
    let event = adapt_state_change(payload)?;
    Ok(bus.emit(STATE_CHANGE_EVENT, &event.to_value()?))
}

// =============================================================================
// Process-wide API
// =============================================================================

/// Shared bus, created on first call.
pub fn get_bus() -> &'static Arc<EventBus> {
    global().get_bus()
}

pub fn subscribe_to_use_updates_event<F>(listener: F) -> Subscription
where
    F: Fn(&UseUpdatesEvent) + Send + Sync + 'static,
{
    global().subscribe_to_use_updates_event(listener)
}

pub fn emit_use_updates_event(event: &UseUpdatesEvent) -> Result<usize> {
    global().emit_use_updates_event(event)
}

pub fn subscribe_to_state_change_event<F>(listener: F) -> Subscription
where
    F: Fn(&UpdatesStateChangeEvent) + Send + Sync + 'static,
{
    global().subscribe_to_state_change_event(listener)
}

pub fn emit_state_change_event(event: &UpdatesStateChangeEvent) -> Result<usize> {
    global().emit_state_change_event(event)
}

pub fn handle_native_state_change_event(payload: &Value) -> Result<usize> {
    global().handle_native_state_change_event(payload)
}
