//! End-to-end tests against the process-wide emitter and native channel.
//!
//! Tests in this binary share one bus and run concurrently, so each one tags
//! its payloads and only counts its own.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use updates_emitter::events::{NATIVE_STATE_CHANGE_EVENT, STATE_CHANGE_EVENT};
use updates_emitter::{
    emit_state_change_event, emit_use_updates_event, get_bus, native_events,
    subscribe_to_state_change_event, subscribe_to_use_updates_event, use_update_events,
    UpdatesStateChangeEvent,
};

fn is_tagged(event: &Value, tag: &str) -> bool {
    event.get("tag").and_then(Value::as_str) == Some(tag)
}

#[test]
fn test_native_string_event_reaches_state_change_subscribers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = subscribe_to_state_change_event(move |event| {
        if event.extra.get("tag") == Some(&json!("native-string")) {
            sink.lock().push(event.clone());
        }
    });

    let payload = json!({
        "tag": "native-string",
        "context": {
            "isUpdateAvailable": true,
            "latestManifestString": "{\"a\":1}"
        }
    });
    native_events().emit(NATIVE_STATE_CHANGE_EVENT, &Value::String(payload.to_string()));

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    let context = seen[0].context.clone();
    assert_eq!(context.latest_manifest, Some(json!({"a": 1})));
    assert!(context.other.get("latestManifestString").is_none());
    assert!(context.downloaded_manifest.is_none());
    drop(seen);

    subscription.remove();
}

#[test]
fn test_single_native_forwarder() {
    let _a = subscribe_to_use_updates_event(|_| {});
    let _b = subscribe_to_state_change_event(|_| {});
    let _bus = get_bus();

    assert_eq!(native_events().listener_count(NATIVE_STATE_CHANGE_EVENT), 1);
}

#[test]
fn test_two_subscribers_in_order_and_release() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    let sub_first = subscribe_to_use_updates_event(move |event| {
        if is_tagged(event, "ordering") {
            first.lock().push(format!("first:{}", event["n"]));
        }
    });
    let second = Arc::clone(&order);
    let sub_second = subscribe_to_use_updates_event(move |event| {
        if is_tagged(event, "ordering") {
            second.lock().push(format!("second:{}", event["n"]));
        }
    });

    emit_use_updates_event(&json!({"tag": "ordering", "n": 1})).unwrap();
    sub_first.remove();
    emit_use_updates_event(&json!({"tag": "ordering", "n": 2})).unwrap();
    sub_second.remove();

    assert_eq!(*order.lock(), vec!["first:1", "second:1", "second:2"]);
}

#[test]
fn test_direct_state_change_emit() {
    let seen = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&seen);
    let subscription = subscribe_to_state_change_event(move |event| {
        if event.extra.get("tag") == Some(&json!("direct")) {
            *sink.lock() += 1;
        }
    });

    let event = UpdatesStateChangeEvent::from_value(json!({
        "tag": "direct",
        "context": {"downloadedManifest": {"id": "d"}}
    }))
    .unwrap();
    emit_state_change_event(&event).unwrap();

    assert_eq!(*seen.lock(), 1);
    subscription.remove();
}

#[test]
fn test_hook_calls_latest_callback_until_unmount() {
    let calls = Arc::new(Mutex::new(Vec::new()));

    let early = Arc::clone(&calls);
    let mut hook = use_update_events(move |event| {
        if is_tagged(event, "hook") {
            early.lock().push("early");
        }
    });

    emit_use_updates_event(&json!({"tag": "hook"})).unwrap();

    let late = Arc::clone(&calls);
    hook.render(move |event| {
        if is_tagged(event, "hook") {
            late.lock().push("late");
        }
    });
    emit_use_updates_event(&json!({"tag": "hook"})).unwrap();

    hook.unmount();
    emit_use_updates_event(&json!({"tag": "hook"})).unwrap();

    assert_eq!(*calls.lock(), vec!["early", "late"]);
}

#[tokio::test]
async fn test_channel_subscriber_sees_adapted_native_event() {
    let (subscription, mut rx) = get_bus().subscribe_channel(STATE_CHANGE_EVENT);

    native_events().emit(
        NATIVE_STATE_CHANGE_EVENT,
        &json!({"tag": "channel", "context": {"downloadedManifestString": "{\"b\":2}"}}),
    );

    loop {
        let event = rx.recv().await.unwrap();
        if is_tagged(&event, "channel") {
            assert_eq!(event["context"]["downloadedManifest"], json!({"b": 2}));
            assert!(event["context"].get("downloadedManifestString").is_none());
            break;
        }
    }
    subscription.remove();
}
