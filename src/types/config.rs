//! Configuration structures.
//!
//! Configuration is loaded from defaults overridden by environment variables.

use serde::{Deserialize, Serialize};

/// Environment variable selecting the log format (`json` or anything else for text).
pub const LOG_FORMAT_ENV: &str = "UPDATES_EMITTER_LOG_FORMAT";

/// Environment variable toggling per-listener panic isolation.
pub const ISOLATE_LISTENERS_ENV: &str = "UPDATES_EMITTER_ISOLATE_LISTENERS";

/// Global emitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Event bus configuration.
    #[serde(default)]
    pub bus: BusConfig,
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.observability.json_logs = format.eq_ignore_ascii_case("json");
        }
        if let Some(flag) = lookup(ISOLATE_LISTENERS_ENV) {
            match parse_flag(&flag) {
                Some(isolate) => self.bus.isolate_listener_panics = isolate,
                None => tracing::warn!(
                    "ignoring {}={:?}: expected true/false",
                    ISOLATE_LISTENERS_ENV,
                    flag
                ),
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BusConfig {
    /// Catch panics per listener so one failing listener does not starve
    /// the rest. When false the panic unwinds into the caller of `emit`.
    pub isolate_listener_panics: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            isolate_listener_panics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_env(|key| vars.get(key).cloned());
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
        assert!(config.bus.isolate_listener_panics);
    }

    #[test]
    fn test_env_overrides() {
        let config = apply(&[(LOG_FORMAT_ENV, "JSON"), (ISOLATE_LISTENERS_ENV, "off")]);
        assert!(config.observability.json_logs);
        assert!(!config.bus.isolate_listener_panics);
    }

    #[test]
    fn test_invalid_flag_keeps_default() {
        let config = apply(&[(ISOLATE_LISTENERS_ENV, "maybe")]);
        assert!(config.bus.isolate_listener_panics);
    }
}
