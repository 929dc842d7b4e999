//! Error types for envelope and codec operations

/// Errors raised by a codec or by the [`Codecs`](crate::Codecs) registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("no codec registered for any acceptable content type: {0:?}")]
    UnsupportedContentType(Vec<String>),

    #[error("failed to encode as {content_type}: {message}")]
    Encode {
        content_type: String,
        message: String,
    },

    #[error("failed to decode {content_type} bytes: {message}")]
    Decode {
        content_type: String,
        message: String,
    },

    #[error("payload does not fit shape {shape}: {message}")]
    Shape {
        shape: &'static str,
        message: String,
    },
}

/// Errors raised by [`EventEnvelope`](crate::EventEnvelope) operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// A typed payload was requested before any codec was attached
    #[error("event {event_id} has no codec attached; cannot materialize a typed payload")]
    MissingCapability { event_id: String },

    /// Codec failure, passed through unchanged
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

impl EnvelopeError {
    /// True when the failure came from the codec collaborator
    pub fn is_codec_error(&self) -> bool {
        matches!(self, EnvelopeError::Codec(_))
    }
}

/// Result type for envelope operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_is_transparent() {
        let inner = CodecError::UnsupportedContentType(vec!["text/csv".to_string()]);
        let err = EnvelopeError::from(inner.clone());

        assert!(err.is_codec_error());
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn test_missing_capability_names_event() {
        let err = EnvelopeError::MissingCapability {
            event_id: "e1".to_string(),
        };

        assert!(!err.is_codec_error());
        assert!(err.to_string().contains("e1"));
    }
}
