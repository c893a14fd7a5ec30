//! Native event channel.
//!
//! In-process stand-in for the native module's device event emitter. The
//! native side emits raw payloads (records or JSON strings) here under
//! [`NATIVE_STATE_CHANGE_EVENT`]; the updates emitter registers itself as the
//! forwarding listener the first time its bus is created.

use crate::bus::EventBus;
use crate::events::NATIVE_STATE_CHANGE_EVENT;
use crate::types::Config;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;

static NATIVE_EVENTS: OnceLock<Arc<EventBus>> = OnceLock::new();

/// Process-wide native event channel.
pub fn native_events() -> &'static Arc<EventBus> {
    NATIVE_EVENTS.get_or_init(|| Arc::new(EventBus::new(Config::from_env().bus)))
}

/// Drain raw native state-change payloads from `rx` into `native`.
///
/// Runs until every sender is dropped and returns the number of payloads
/// emitted.
pub async fn pump_native_events(
    mut rx: mpsc::UnboundedReceiver<Value>,
    native: Arc<EventBus>,
) -> u64 {
    let mut pumped = 0;
    while let Some(payload) = rx.recv().await {
        native.emit(NATIVE_STATE_CHANGE_EVENT, &payload);
        pumped += 1;
    }
    tracing::debug!("Native event pump finished after {} events", pumped);
    pumped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_events_is_shared() {
        assert!(Arc::ptr_eq(native_events(), native_events()));
    }

    #[tokio::test]
    async fn test_pump_forwards_until_closed() {
        let native = Arc::new(EventBus::default());
        let (_sub, mut seen) = native.subscribe_channel(NATIVE_STATE_CHANGE_EVENT);

        let (tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_native_events(rx, Arc::clone(&native)));

        tx.send(json!({"context": {}})).unwrap();
        tx.send(json!("{\"context\":{}}")).unwrap();
        drop(tx);

        assert_eq!(pump.await.unwrap(), 2);
        assert_eq!(seen.recv().await.unwrap(), json!({"context": {}}));
        assert!(seen.recv().await.unwrap().is_string());
    }
}
