//! Updates emitter stdio bridge - main entry point.
//!
//! Reads newline-delimited native state-change payloads from stdin, feeds them
//! through the native channel, and writes every adapted
//! `Expo.updatesStateChangeEvent` to stdout as one JSON line.

use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use updates_emitter::events::STATE_CHANGE_EVENT;
use updates_emitter::observability::init_tracing_with;
use updates_emitter::types::ObservabilityConfig;
use updates_emitter::{emitter, native_events, pump_native_events};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "updates-emitter",
    about = "Adapt native updates state-change events from stdin"
)]
struct Args {
    /// Log output format (logs go to stderr).
    #[arg(
        long,
        value_enum,
        default_value_t = LogFormat::Text,
        ignore_case = true,
        env = "UPDATES_EMITTER_LOG_FORMAT"
    )]
    log_format: LogFormat,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing_with(&ObservabilityConfig {
        log_level: args.log_level,
        json_logs: args.log_format == LogFormat::Json,
    });

    // Subscribing creates the bus and attaches the native forwarder.
    let (subscription, mut adapted) = emitter::global().subscribe_channel(STATE_CHANGE_EVENT);

    let (tx, rx) = mpsc::unbounded_channel();
    let pump = tokio::spawn(pump_native_events(rx, Arc::clone(native_events())));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = adapted.recv().await {
            let mut line = serde_json::to_vec(&event)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<_, updates_emitter::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Invalid JSON is forwarded as a raw string so the adapter reports it.
        let payload = serde_json::from_str::<Value>(line)
            .unwrap_or_else(|_| Value::String(line.to_string()));
        if tx.send(payload).is_err() {
            break;
        }
    }
    drop(tx);

    let pumped = pump.await?;
    // Delivery is synchronous, so every adapted event is queued by now.
    subscription.remove();
    writer.await??;

    tracing::info!("Processed {} native events", pumped);

    Ok(())
}
