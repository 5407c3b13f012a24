//! Platform wire shapes.
//!
//! # Responsibilities
//! - Model the flattened trigger event the platform delivers
//! - Model the native response-builder shape handed back to the platform
//!
//! # Design Decisions
//! - `InboundEvent` is immutable once constructed; all richer views are
//!   built by the request adapter
//! - `PlatformResponse` keeps headers as an ordered list of `(name, value)`
//!   lines, matching the platform's repeated `header(k, v)` builder calls;
//!   the serialized form groups them into a name -> values map
//! - A binary body is carried as raw bytes in memory and base64 text plus
//!   an `isBase64Encoded` flag on the wire

pub mod builder;

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

pub use builder::EventBuilder;

/// The flattened HTTP trigger event delivered by the hosting platform.
///
/// Header values may already be comma-joined for repeated headers; binary
/// payloads arrive base64-encoded with `is_base64_encoded` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundEvent {
    /// HTTP method name as delivered, e.g. `GET`.
    pub method: String,

    /// Full request URI.
    pub uri: String,

    /// Flat header map; repeated headers are comma-joined.
    pub headers: HashMap<String, String>,

    /// Flat query parameter map.
    pub query_parameters: HashMap<String, String>,

    /// Textual body; base64 text when `is_base64_encoded` is set.
    pub body: Option<String>,

    /// Platform flag marking the body as base64-encoded binary.
    pub is_base64_encoded: bool,
}

impl Default for InboundEvent {
    fn default() -> Self {
        InboundEvent {
            method: "GET".to_string(),
            uri: "/".to_string(),
            headers: HashMap::new(),
            query_parameters: HashMap::new(),
            body: None,
            is_base64_encoded: false,
        }
    }
}

impl InboundEvent {
    /// Start building an event, mainly for tests and local tooling.
    pub fn builder(method: impl Into<String>, uri: impl Into<String>) -> EventBuilder {
        EventBuilder::new(method, uri)
    }

    /// The path component of the URI.
    pub fn path(&self) -> &str {
        let without_scheme = match self.uri.find("://") {
            Some(i) => match self.uri[i + 3..].find('/') {
                Some(j) => &self.uri[i + 3 + j..],
                None => "/",
            },
            None => self.uri.as_str(),
        };
        match without_scheme.split_once('?') {
            Some((path, _)) => path,
            None => without_scheme,
        }
    }
}

/// Response body in its in-memory form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformBody {
    /// Decoded text, emitted as-is.
    Text(String),
    /// Raw bytes, emitted as base64 with the wire flag set.
    Binary(Vec<u8>),
}

/// The platform-native response representation produced by
/// materialization. Headers are ordered lines; repeated names are allowed
/// and `Set-Cookie` relies on that.
#[derive(Debug, Clone)]
pub struct PlatformResponse {
    status_code: u16,
    reason: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<PlatformBody>,
}

impl PlatformResponse {
    /// Create a response with the given status.
    pub fn with_status(status_code: u16, reason: Option<String>) -> PlatformResponse {
        PlatformResponse {
            status_code,
            reason,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append one header line, preserving insertion order.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Assign the body.
    pub fn set_body(&mut self, body: PlatformBody) {
        self.body = Some(body);
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// First header value for a name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All header values for a name, in insertion order.
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All header lines in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Headers grouped into a name -> values map (the platform map shape).
    pub fn headers_map(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in &self.headers {
            map.entry(name.clone()).or_default().push(value.clone());
        }
        map
    }

    pub fn body(&self) -> Option<&PlatformBody> {
        self.body.as_ref()
    }

    /// The body as text, when it is textual.
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            Some(PlatformBody::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The body as raw bytes, when it is binary.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Some(PlatformBody::Binary(b)) => Some(b),
            _ => None,
        }
    }

    /// True when the wire form carries base64.
    pub fn is_base64_encoded(&self) -> bool {
        matches!(self.body, Some(PlatformBody::Binary(_)))
    }
}

impl Serialize for PlatformResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PlatformResponse", 4)?;
        state.serialize_field("statusCode", &self.status_code)?;
        state.serialize_field("headers", &self.headers_map())?;
        match &self.body {
            Some(PlatformBody::Text(text)) => {
                state.serialize_field("body", text)?;
                state.serialize_field("isBase64Encoded", &false)?;
            }
            Some(PlatformBody::Binary(bytes)) => {
                state.serialize_field("body", &BASE64.encode(bytes))?;
                state.serialize_field("isBase64Encoded", &true)?;
            }
            None => {
                state.serialize_field("body", &Option::<String>::None)?;
                state.serialize_field("isBase64Encoded", &false)?;
            }
        }
        state.end()
    }
}
