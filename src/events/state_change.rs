//! State-change adaptation — native update events → bus state-change events.
//!
//! Pure deterministic mapping. Native payloads arrive either as a record or as
//! a JSON-encoded string of one, and carry manifests as string-encoded JSON:
//!
//!   context.latestManifestString     → context.latestManifest
//!   context.downloadedManifestString → context.downloadedManifest
//!   (all other fields)               → passed through
//!
//! An empty manifest string is not parsed. It stays in place only when the
//! record carries no parsed form of that manifest.

use super::types::{present, UpdatesContext, UpdatesStateChangeEvent};
use crate::types::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

const LATEST_MANIFEST_STRING: &str = "latestManifestString";
const DOWNLOADED_MANIFEST_STRING: &str = "downloadedManifestString";

/// Native wire shape, validated at the boundary.
#[derive(Debug, Deserialize)]
struct NativeStateChangeEvent {
    context: NativeContext,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NativeContext {
    #[serde(default)]
    latest_manifest_string: Option<String>,
    #[serde(default)]
    downloaded_manifest_string: Option<String>,
    #[serde(default, deserialize_with = "present")]
    latest_manifest: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    downloaded_manifest: Option<Value>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// Adapt a native state-change payload.
///
/// Errors with [`Error::MalformedPayload`] when the payload string or either
/// manifest string is not valid JSON, and [`Error::ShapeMismatch`] when the
/// JSON is not a record with an object `context`.
pub fn adapt_state_change(payload: &Value) -> Result<UpdatesStateChangeEvent> {
    let record = match payload {
        Value::String(encoded) => {
            serde_json::from_str(encoded).map_err(|e| Error::malformed("payload", e))?
        }
        other => other.clone(),
    };

    let native: NativeStateChangeEvent = serde_json::from_value(record)
        .map_err(|e| Error::shape_mismatch(format!("not a state change event: {e}")))?;

    let NativeContext {
        latest_manifest_string,
        downloaded_manifest_string,
        latest_manifest,
        downloaded_manifest,
        mut other,
    } = native.context;

    let latest_manifest = parse_manifest(
        latest_manifest_string,
        latest_manifest,
        LATEST_MANIFEST_STRING,
        "context.latestManifestString",
        &mut other,
    )?;
    let downloaded_manifest = parse_manifest(
        downloaded_manifest_string,
        downloaded_manifest,
        DOWNLOADED_MANIFEST_STRING,
        "context.downloadedManifestString",
        &mut other,
    )?;

    Ok(UpdatesStateChangeEvent {
        context: UpdatesContext {
            latest_manifest,
            downloaded_manifest,
            other,
        },
        extra: native.extra,
    })
}

/// A non-empty string replaces any parsed manifest already on the record.
/// The string and parsed forms never both survive.
fn parse_manifest(
    encoded: Option<String>,
    existing: Option<Value>,
    key: &str,
    field: &'static str,
    other: &mut Map<String, Value>,
) -> Result<Option<Value>> {
    match encoded {
        Some(s) if !s.is_empty() => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| Error::malformed(field, e)),
        Some(empty) => {
            if existing.is_none() {
                other.insert(key.to_string(), Value::String(empty));
            }
            Ok(existing)
        }
        None => Ok(existing),
    }
}
