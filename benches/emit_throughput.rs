//! Bus emit and state-change adaptation benchmark.
//!
//! Measures synchronous fan-out cost by listener count and the adapter's
//! parsing cost for record vs JSON-string payloads using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use updates_emitter::events::adapt_state_change;
use updates_emitter::EventBus;

fn bench_emit_fan_out(c: &mut Criterion) {
    let listener_counts: &[usize] = &[1, 4, 16, 64];
    let payload = json!({"type": "check", "isUpdateAvailable": true});

    let mut group = c.benchmark_group("emit_fan_out");
    for &count in listener_counts {
        let bus = EventBus::default();
        let _subs: Vec<_> = (0..count)
            .map(|_| bus.subscribe("bench.event", |p| {
                black_box(p);
            }))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &payload, |b, p| {
            b.iter(|| bus.emit("bench.event", black_box(p)));
        });
    }
    group.finish();
}

fn bench_adapt_state_change(c: &mut Criterion) {
    let manifest = json!({
        "id": "0f1e2d3c",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "runtimeVersion": "1.0.0",
        "launchAsset": {"key": "bundle", "contentType": "application/javascript"},
        "assets": (0..32)
            .map(|i| json!({"key": format!("asset-{i}"), "hash": "abcdef"}))
            .collect::<Vec<_>>(),
    });
    let record = json!({
        "context": {
            "isUpdateAvailable": true,
            "isUpdatePending": false,
            "latestManifestString": manifest.to_string(),
            "downloadedManifestString": manifest.to_string(),
        }
    });
    let encoded = Value::String(record.to_string());

    let mut group = c.benchmark_group("adapt_state_change");
    group.bench_function("record", |b| {
        b.iter(|| adapt_state_change(black_box(&record)).unwrap());
    });
    group.bench_function("json_string", |b| {
        b.iter(|| adapt_state_change(black_box(&encoded)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_emit_fan_out, bench_adapt_state_change);
criterion_main!(benches);
