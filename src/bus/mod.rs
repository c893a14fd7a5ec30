//! Named-channel event bus with synchronous fan-out.
//!
//! Listeners are registered per event name and invoked on the emitting thread,
//! in registration order. Patterns supported:
//!   - **Callbacks**: `subscribe` with a closure, released via [`Subscription::remove`]
//!   - **Channels**: `subscribe_channel` returning a tokio receiver fed by the bus
//!
//! Emission snapshots the listener list and drops the lock before delivery, so
//! a listener may subscribe or unsubscribe (itself included) mid-delivery.

use crate::types::{BusConfig, SubscriptionId};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// Callback invoked with each payload emitted on its event name.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

// =============================================================================
// Listener Registry
// =============================================================================

/// Reports whether a registration's consumer has gone away.
type ClosedCheck = Box<dyn Fn() -> bool + Send + Sync>;

struct Registration {
    id: SubscriptionId,
    listener: Listener,
    closed: Option<ClosedCheck>,
}

impl Registration {
    fn is_closed(&self) -> bool {
        self.closed.as_ref().is_some_and(|closed| closed())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

type ListenerMap = HashMap<String, Vec<Registration>>;

/// Handle for one registered listener.
///
/// Dropping the handle leaves the listener registered; call [`remove`](Self::remove)
/// to stop delivery.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    event_name: String,
    registry: Weak<RwLock<ListenerMap>>,
    removed: AtomicBool,
}

impl Subscription {
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Whether this handle still has a listener attached.
    pub fn is_active(&self) -> bool {
        if self.removed.load(Ordering::Acquire) {
            return false;
        }
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .read()
                .get(&self.event_name)
                .is_some_and(|regs| regs.iter().any(|r| r.id == self.id))
        })
    }

    /// Detach the listener. Returns true only on the call that removed it.
    pub fn remove(&self) -> bool {
        if self.removed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let mut listeners = registry.write();
        if let Some(regs) = listeners.get_mut(&self.event_name) {
            regs.retain(|r| r.id != self.id);
            if regs.is_empty() {
                listeners.remove(&self.event_name);
            }
        }

        tracing::debug!("Unsubscribed {} from {}", self.id, self.event_name);
        true
    }
}

// =============================================================================
// EventBus
// =============================================================================

/// Statistics about bus usage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStats {
    pub events_emitted: u64,
    pub listener_invocations: u64,
    pub listener_panics: u64,
    pub active_listeners: usize,
}

/// In-memory publish/subscribe hub keyed by event name.
pub struct EventBus {
    /// Listeners: event_name -> registrations in subscription order
    listeners: Arc<RwLock<ListenerMap>>,

    /// Statistics
    stats: Mutex<BusStats>,

    config: BusConfig,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("channels", &self.listeners.read().len())
            .field("config", &self.config)
            .finish()
    }
}

impl EventBus {
    /// Create a new EventBus instance.
    pub fn new(config: BusConfig) -> Self {
        Self {
            listeners: Arc::new(RwLock::new(HashMap::new())),
            stats: Mutex::new(BusStats::default()),
            config,
        }
    }

    /// Register `listener` for `event_name`. No deduplication: registering the
    /// same callback twice delivers twice.
    pub fn subscribe<F>(&self, event_name: &str, listener: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe_listener(event_name, Arc::new(listener))
    }

    /// Register an already shared listener.
    pub fn subscribe_listener(&self, event_name: &str, listener: Listener) -> Subscription {
        self.register(event_name, listener, None)
    }

    fn register(
        &self,
        event_name: &str,
        listener: Listener,
        closed: Option<ClosedCheck>,
    ) -> Subscription {
        let id = SubscriptionId::new();

        self.listeners
            .write()
            .entry(event_name.to_string())
            .or_default()
            .push(Registration {
                id: id.clone(),
                listener,
                closed,
            });

        tracing::debug!("Subscriber {} registered for {}", id, event_name);

        Subscription {
            id,
            event_name: event_name.to_string(),
            registry: Arc::downgrade(&self.listeners),
            removed: AtomicBool::new(false),
        }
    }

    /// Subscribe with a channel instead of a callback.
    ///
    /// Payloads are cloned into an unbounded tokio channel. Once the receiver
    /// is dropped, the next emit on `event_name` unregisters the subscription.
    pub fn subscribe_channel(
        &self,
        event_name: &str,
    ) -> (Subscription, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let watch = tx.clone();
        let listener: Listener = Arc::new(move |payload: &Value| {
            let _ = tx.send(payload.clone());
        });
        let closed: ClosedCheck = Box::new(move || watch.is_closed());
        let subscription = self.register(event_name, listener, Some(closed));
        (subscription, rx)
    }

    /// Deliver `payload` to every listener of `event_name`.
    ///
    /// Returns the number of listeners that ran to completion.
    pub fn emit(&self, event_name: &str, payload: &Value) -> usize {
        let mut found_closed = false;
        let snapshot: Vec<Listener> = self
            .listeners
            .read()
            .get(event_name)
            .map(|regs| {
                regs.iter()
                    .filter(|r| {
                        let closed = r.is_closed();
                        found_closed |= closed;
                        !closed
                    })
                    .map(|r| Arc::clone(&r.listener))
                    .collect()
            })
            .unwrap_or_default();

        if found_closed {
            self.prune_closed(event_name);
        }

        let mut delivered = 0;
        let mut panicked = 0;
        for listener in &snapshot {
            if self.config.isolate_listener_panics {
                match panic::catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                    Ok(()) => delivered += 1,
                    Err(cause) => {
                        panicked += 1;
                        tracing::error!(
                            "Listener for {} panicked: {}",
                            event_name,
                            panic_message(cause.as_ref())
                        );
                    }
                }
            } else {
                listener(payload);
                delivered += 1;
            }
        }

        {
            let mut stats = self.stats.lock();
            stats.events_emitted += 1;
            stats.listener_invocations += delivered as u64;
            stats.listener_panics += panicked;
        }

        tracing::debug!("Emitted {} to {} listeners", event_name, delivered);

        delivered
    }

    fn prune_closed(&self, event_name: &str) {
        let mut listeners = self.listeners.write();
        if let Some(regs) = listeners.get_mut(event_name) {
            let before = regs.len();
            regs.retain(|r| !r.is_closed());
            tracing::debug!(
                "Pruned {} closed subscribers from {}",
                before - regs.len(),
                event_name
            );
            if regs.is_empty() {
                listeners.remove(event_name);
            }
        }
    }

    /// Number of listeners currently registered for `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners.read().get(event_name).map_or(0, Vec::len)
    }

    /// Get current bus statistics.
    pub fn get_stats(&self) -> BusStats {
        let mut stats = self.stats.lock().clone();
        stats.active_listeners = self.listeners.read().values().map(Vec::len).sum();
        stats
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(msg) = cause.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = cause.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

// =============================================================================
// Tests
// =============================================================================
