//! Content codec registry.
//!
//! # Responsibilities
//! - Map media types to encode/decode functions
//! - Stay read-only after startup so many invocations can share one
//!   registry concurrently
//!
//! # Design Decisions
//! - Codecs work on `serde_json::Value` as the interchange shape; typed
//!   views are layered on top by the request adapter
//! - Lookup is by essence with a `+json` suffix fallback, so
//!   `application/problem+json` resolves to the JSON codec

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::http::media::{self, MediaType};

/// An encoder/decoder for one family of media types.
pub trait MediaCodec: Send + Sync {
    /// Essences this codec handles exactly.
    fn media_types(&self) -> Vec<String>;

    /// True when the codec can take types it does not list exactly, such
    /// as `+json` structured syntaxes.
    fn supports(&self, media_type: &MediaType) -> bool {
        self.media_types()
            .iter()
            .any(|essence| media_type.matches_essence(essence))
    }

    /// Decode raw bytes into the interchange value.
    fn decode(&self, bytes: &[u8], media_type: &MediaType) -> Result<serde_json::Value, GatewayError>;

    /// Encode the interchange value into raw bytes.
    fn encode(&self, value: &serde_json::Value, media_type: &MediaType) -> Result<Vec<u8>, GatewayError>;
}

/// JSON codec backed by `serde_json`. Handles `application/json`,
/// `text/json`, and any `+json` structured syntax.
#[derive(Debug, Default)]
pub struct JsonCodec;

impl MediaCodec for JsonCodec {
    fn media_types(&self) -> Vec<String> {
        vec![media::APPLICATION_JSON.to_string(), "text/json".to_string()]
    }

    fn supports(&self, media_type: &MediaType) -> bool {
        media_type.has_json_nature() || media_type.matches_essence("text/json")
    }

    fn decode(&self, bytes: &[u8], media_type: &MediaType) -> Result<serde_json::Value, GatewayError> {
        serde_json::from_slice(bytes).map_err(|e| GatewayError::codec(media_type.essence(), e))
    }

    fn encode(&self, value: &serde_json::Value, media_type: &MediaType) -> Result<Vec<u8>, GatewayError> {
        serde_json::to_vec(value).map_err(|e| GatewayError::codec(media_type.essence(), e))
    }
}

/// Plain-text codec: decodes to a JSON string value, encodes string values
/// verbatim.
#[derive(Debug, Default)]
pub struct TextCodec;

impl MediaCodec for TextCodec {
    fn media_types(&self) -> Vec<String> {
        vec![media::TEXT_PLAIN.to_string()]
    }

    fn decode(&self, bytes: &[u8], _media_type: &MediaType) -> Result<serde_json::Value, GatewayError> {
        Ok(serde_json::Value::String(
            String::from_utf8_lossy(bytes).into_owned(),
        ))
    }

    fn encode(&self, value: &serde_json::Value, _media_type: &MediaType) -> Result<Vec<u8>, GatewayError> {
        match value {
            serde_json::Value::String(s) => Ok(s.clone().into_bytes()),
            other => Ok(other.to_string().into_bytes()),
        }
    }
}

/// Registry of codecs keyed by media type. Built once at startup, then
/// shared read-only across invocations.
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn MediaCodec>>,
    by_essence: HashMap<String, usize>,
}

impl CodecRegistry {
    /// An empty registry.
    pub fn new() -> CodecRegistry {
        CodecRegistry {
            codecs: Vec::new(),
            by_essence: HashMap::new(),
        }
    }

    /// Registry with the default JSON and plain-text codecs.
    pub fn with_defaults() -> CodecRegistry {
        let mut registry = CodecRegistry::new();
        registry.register(Arc::new(JsonCodec));
        registry.register(Arc::new(TextCodec));
        registry
    }

    /// Register a codec for all of its listed media types. Later
    /// registrations win on conflict.
    pub fn register(&mut self, codec: Arc<dyn MediaCodec>) {
        let index = self.codecs.len();
        for essence in codec.media_types() {
            self.by_essence.insert(essence.to_ascii_lowercase(), index);
        }
        self.codecs.push(codec);
    }

    /// Find a codec for the media type: exact essence first, then any
    /// codec whose `supports` accepts it.
    pub fn find_codec(&self, media_type: &MediaType) -> Option<&Arc<dyn MediaCodec>> {
        if let Some(&index) = self.by_essence.get(media_type.essence()) {
            return Some(&self.codecs[index]);
        }
        self.codecs.iter().find(|c| c.supports(media_type))
    }

    /// Decode through the codec resolved for the media type.
    pub fn decode(
        &self,
        bytes: &[u8],
        media_type: &MediaType,
    ) -> Result<serde_json::Value, GatewayError> {
        let codec = self
            .find_codec(media_type)
            .ok_or_else(|| GatewayError::NoCodec(media_type.essence().to_string()))?;
        codec.decode(bytes, media_type)
    }

    /// Encode through the codec resolved for the media type.
    pub fn encode(
        &self,
        value: &serde_json::Value,
        media_type: &MediaType,
    ) -> Result<Vec<u8>, GatewayError> {
        let codec = self
            .find_codec(media_type)
            .ok_or_else(|| GatewayError::NoCodec(media_type.essence().to_string()))?;
        codec.encode(value, media_type)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        CodecRegistry::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let registry = CodecRegistry::with_defaults();
        let mt = MediaType::json();
        let value = json!({"name": "Dino", "age": 12});
        let bytes = registry.encode(&value, &mt).unwrap();
        let back = registry.decode(&bytes, &mt).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_json_suffix_resolution() {
        let registry = CodecRegistry::with_defaults();
        let mt = MediaType::parse("application/problem+json").unwrap();
        assert!(registry.find_codec(&mt).is_some());
        let decoded = registry.decode(b"{\"title\":\"broken\"}", &mt).unwrap();
        assert_eq!(decoded, json!({"title": "broken"}));
    }

    #[test]
    fn test_unknown_type_has_no_codec() {
        let registry = CodecRegistry::with_defaults();
        let mt = MediaType::parse("application/msgpack").unwrap();
        assert!(registry.find_codec(&mt).is_none());
        match registry.decode(b"x", &mt) {
            Err(GatewayError::NoCodec(essence)) => assert_eq!(essence, "application/msgpack"),
            other => panic!("expected NoCodec, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_is_codec_error() {
        let registry = CodecRegistry::with_defaults();
        let err = registry.decode(b"{not json", &MediaType::json()).unwrap_err();
        assert!(matches!(err, GatewayError::Codec { .. }));
    }
}
