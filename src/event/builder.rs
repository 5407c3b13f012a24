//! Fluent construction of inbound events for tests and local tooling.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::codec::CodecRegistry;
use crate::event::InboundEvent;
use crate::http::media::{self, MediaType};

/// Builder producing an [`InboundEvent`] the way the platform would
/// deliver it: flat maps, textual body, base64 flag for binary payloads.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    method: String,
    uri: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Option<String>,
    is_base64_encoded: bool,
}

impl EventBuilder {
    /// Start a builder for the given method and URI.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> EventBuilder {
        EventBuilder {
            method: method.into(),
            uri: uri.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: None,
            is_base64_encoded: false,
        }
    }

    /// Set a header, replacing any previous value for the name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> EventBuilder {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Append a header value, comma-joining with any existing value the
    /// way the platform flattens repeated headers.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> EventBuilder {
        let name = name.into();
        let value = value.into();
        self.headers
            .entry(name)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
        self
    }

    /// Set a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> EventBuilder {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set a textual body.
    pub fn body_text(mut self, body: impl Into<String>) -> EventBuilder {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Set a binary body, base64-encoding it and marking the event, with
    /// `application/octet-stream` as the content type when none was set.
    pub fn body_bytes(mut self, bytes: &[u8]) -> EventBuilder {
        self.body = Some(BASE64.encode(bytes));
        self.is_base64_encoded = true;
        if !self.has_content_type() {
            self = self.header("Content-Type", media::APPLICATION_OCTET_STREAM);
        }
        self
    }

    /// Serialize a value as the JSON body, defaulting the content type to
    /// `application/json` when none was set.
    pub fn body_json(mut self, value: &impl Serialize) -> EventBuilder {
        self.body = Some(serde_json::to_string(value).expect("value serializes to JSON"));
        self.is_base64_encoded = false;
        if !self.has_content_type() {
            self = self.header("Content-Type", media::APPLICATION_JSON);
        }
        self
    }

    /// Encode a structured value through the codec registry, keyed by the
    /// declared content type (default `application/json`); when no codec
    /// matches, the value's string representation is used.
    pub fn body_encoded(mut self, value: &serde_json::Value, registry: &CodecRegistry) -> EventBuilder {
        let media_type = self.content_type().unwrap_or_else(MediaType::json);
        let text = match registry.encode(value, &media_type) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => value.to_string(),
        };
        self.body = Some(text);
        self.is_base64_encoded = false;
        if !self.has_content_type() {
            self = self.header("Content-Type", media::APPLICATION_JSON);
        }
        self
    }

    fn has_content_type(&self) -> bool {
        self.headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
    }

    fn content_type(&self) -> Option<MediaType> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, v)| MediaType::parse(v))
    }

    /// Finish building.
    pub fn build(self) -> InboundEvent {
        InboundEvent {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            query_parameters: self.query,
            body: self.body,
            is_base64_encoded: self.is_base64_encoded,
        }
    }
}
