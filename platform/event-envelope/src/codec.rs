//! # Codecs
//!
//! The codec capability an envelope uses to materialize its payload.
//!
//! A [`Codec`] handles one wire format and converts between bytes and a
//! generic `serde_json::Value` tree. [`Codecs`] is the registry handed to
//! envelopes: it negotiates a content type on encode and projects decoded
//! trees into the caller's typed shape on decode.

use crate::error::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Canonical intermediate content type for payload materialization
pub const APPLICATION_JSON: &str = "application/json";

/// A single wire format
pub trait Codec: Send + Sync {
    /// Content type this codec reads and writes (e.g. `application/json`)
    fn content_type(&self) -> &str;

    /// Serialize a generic value tree into bytes
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    /// Parse bytes into a generic value tree
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// JSON codec backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode {
            content_type: APPLICATION_JSON.to_string(),
            message: e.to_string(),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            content_type: APPLICATION_JSON.to_string(),
            message: e.to_string(),
        })
    }
}

/// Bytes produced by [`Codecs::encode`] together with the negotiated content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingResult {
    pub payload: Vec<u8>,
    pub content_type: String,
}

/// Registry of codecs keyed by content type
///
/// Cloning is cheap; codecs are shared behind `Arc`.
///
/// # Example
///
/// ```rust
/// use event_envelope::{Codecs, APPLICATION_JSON};
/// use serde_json::json;
///
/// let codecs = Codecs::json();
/// let encoded = codecs.encode(&json!({"amount": 100}), &[APPLICATION_JSON]).unwrap();
/// assert_eq!(encoded.content_type, APPLICATION_JSON);
///
/// let amount: serde_json::Value = codecs.decode(&encoded.payload, &encoded.content_type).unwrap();
/// assert_eq!(amount["amount"], 100);
/// ```
#[derive(Clone)]
pub struct Codecs {
    codecs: Vec<Arc<dyn Codec>>,
}

impl Codecs {
    /// Registry with no codecs; every encode and decode fails until one is registered
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Registry holding only the JSON codec
    pub fn json() -> Self {
        Self::empty().with_codec(Arc::new(JsonCodec))
    }

    /// Add a codec, replacing any codec already registered for its content type
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.register(codec);
        self
    }

    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        let key = essence(codec.content_type());
        self.codecs.retain(|c| essence(c.content_type()) != key);
        self.codecs.push(codec);
    }

    /// Registered content types, in registration order
    pub fn content_types(&self) -> Vec<&str> {
        self.codecs.iter().map(|c| c.content_type()).collect()
    }

    pub fn supports(&self, content_type: &str) -> bool {
        self.lookup(content_type).is_some()
    }

    /// Serialize `value` using the first acceptable content type that has a codec
    ///
    /// Acceptable types are tried in the caller's order. Matching ignores case
    /// and media-type parameters such as `; charset=utf-8`.
    pub fn encode<T>(&self, value: &T, acceptable: &[&str]) -> Result<EncodingResult, CodecError>
    where
        T: Serialize + ?Sized,
    {
        let codec = self.negotiate(acceptable).ok_or_else(|| {
            CodecError::UnsupportedContentType(acceptable.iter().map(|s| s.to_string()).collect())
        })?;
        let content_type = codec.content_type().to_string();

        let tree = serde_json::to_value(value).map_err(|e| CodecError::Encode {
            content_type: content_type.clone(),
            message: e.to_string(),
        })?;
        let payload = codec.encode(&tree)?;

        debug!(
            content_type = %content_type,
            bytes = payload.len(),
            "Payload encoded"
        );

        Ok(EncodingResult {
            payload,
            content_type,
        })
    }

    /// Deserialize `bytes` of the declared content type into `T`
    pub fn decode<T>(&self, bytes: &[u8], content_type: &str) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        let codec = self
            .lookup(content_type)
            .ok_or_else(|| CodecError::UnsupportedContentType(vec![content_type.to_string()]))?;

        let tree = codec.decode(bytes)?;
        let shape = std::any::type_name::<T>();

        trace!(content_type = %content_type, shape = shape, "Projecting decoded payload");

        serde_json::from_value(tree).map_err(|e| CodecError::Shape {
            shape,
            message: e.to_string(),
        })
    }

    fn negotiate(&self, acceptable: &[&str]) -> Option<&Arc<dyn Codec>> {
        acceptable.iter().find_map(|ct| self.lookup(ct))
    }

    fn lookup(&self, content_type: &str) -> Option<&Arc<dyn Codec>> {
        let key = essence(content_type);
        self.codecs.iter().find(|c| essence(c.content_type()) == key)
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codecs")
            .field("content_types", &self.content_types())
            .finish()
    }
}

/// Media type without parameters, lowercased
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
