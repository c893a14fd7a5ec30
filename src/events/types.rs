//! Event payload types carried on the outgoing channels.

use crate::types::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Hook-level event. Shape is owned by callers and passed through untouched.
pub type UseUpdatesEvent = Value;

/// Adapted state-change record emitted on [`STATE_CHANGE_EVENT`](super::STATE_CHANGE_EVENT).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdatesStateChangeEvent {
    pub context: UpdatesContext,

    /// Top-level fields other than `context`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Updates state context with manifests in parsed form.
///
/// The manifest string forms never appear alongside the parsed fields: the
/// adapter consumes them when it fills `latest_manifest`/`downloaded_manifest`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatesContext {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub latest_manifest: Option<Value>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub downloaded_manifest: Option<Value>,

    /// Remaining state flags (`isUpdateAvailable`, `isChecking`, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl UpdatesContext {
    /// Boolean state flag from the pass-through fields, e.g. `isUpdateAvailable`.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.other.get(name).and_then(Value::as_bool)
    }
}

impl UpdatesStateChangeEvent {
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`; a missing key stays `None`
/// through `#[serde(default)]`.
pub(crate) fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
