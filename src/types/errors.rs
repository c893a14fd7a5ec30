//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the updates emitter.
#[derive(Error, Debug)]
pub enum Error {
    /// An emit path was used before the shared bus was created.
    #[error("EventEmitter must be initialized to use from its listener")]
    BusNotInitialized,

    /// A payload string or manifest string field is not valid JSON.
    #[error("malformed payload in {field}: {source}")]
    MalformedPayload {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The payload is valid JSON but not shaped like an updates event.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn malformed(field: &'static str, source: serde_json::Error) -> Self {
        Self::MalformedPayload { field, source }
    }

    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// True for errors caused by the incoming payload rather than bus usage.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedPayload { .. } | Error::ShapeMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_not_initialized_message_is_fixed() {
        assert_eq!(
            Error::BusNotInitialized.to_string(),
            "EventEmitter must be initialized to use from its listener"
        );
    }

    #[test]
    fn test_malformed_names_field() {
        let source = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = Error::malformed("context.latestManifestString", source);
        assert!(err.to_string().contains("context.latestManifestString"));
        assert!(err.is_payload_error());
        assert!(!Error::BusNotInitialized.is_payload_error());
    }
}
