//! Outbound response adaptation.
//!
//! # Responsibilities
//! - Accumulate status, headers, cookies, and body writes for one
//!   invocation
//! - Materialize the platform-native response exactly once, choosing
//!   byte or text transport via the binary classifier
//!
//! # Design Decisions
//! - Cookies are buffered apart from ordinary headers and flushed as one
//!   `Set-Cookie` line each; comma-merging would corrupt the grammar
//! - The byte accumulator wins over an assigned structured body when both
//!   exist, matching the platform builder's precedence
//! - Mutation after materialization is a programming error and panics

use std::sync::Arc;

use crate::codec::CodecRegistry;
use crate::event::{PlatformBody, PlatformResponse};
use crate::http::binary::BinaryContentClassifier;
use crate::http::cookies::Cookie;
use crate::http::headers::{self, Headers};
use crate::http::media::{self, MediaType};

/// Mutable response state for one invocation. Write into it from the
/// application handler, then let the host call [`materialize`].
///
/// [`materialize`]: GatewayResponse::materialize
pub struct GatewayResponse {
    status: u16,
    reason: Option<String>,
    headers: Headers,
    cookies: Vec<Cookie>,
    buffer: Option<Vec<u8>>,
    value: Option<serde_json::Value>,
    finalized: bool,
    codecs: Arc<CodecRegistry>,
    classifier: Arc<BinaryContentClassifier>,
}

impl GatewayResponse {
    /// Fresh response with status 200 and no headers.
    pub fn new(codecs: Arc<CodecRegistry>, classifier: Arc<BinaryContentClassifier>) -> GatewayResponse {
        GatewayResponse {
            status: 200,
            reason: None,
            headers: Headers::new(),
            cookies: Vec::new(),
            buffer: None,
            value: None,
            finalized: false,
            codecs,
            classifier,
        }
    }

    fn assert_mutable(&self) {
        assert!(
            !self.finalized,
            "response mutated after materialization; adapters are single-use"
        );
    }

    /// Set the status code.
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.assert_mutable();
        self.status = status;
        self
    }

    /// Set the status code with an explicit reason phrase.
    pub fn status_with_reason(&mut self, status: u16, reason: impl Into<String>) -> &mut Self {
        self.assert_mutable();
        self.status = status;
        self.reason = Some(reason.into());
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Append a header value.
    pub fn header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.assert_mutable();
        self.headers.add(name, value);
        self
    }

    /// Replace all values for a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.assert_mutable();
        self.headers.set(name, value);
        self
    }

    /// Remove a header.
    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.assert_mutable();
        self.headers.remove(name);
        self
    }

    /// Set the `Content-Type` header.
    pub fn content_type(&mut self, value: &str) -> &mut Self {
        self.set_header(headers::CONTENT_TYPE, value)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Buffer a cookie; it becomes one `Set-Cookie` line at
    /// materialization.
    pub fn cookie(&mut self, cookie: Cookie) -> &mut Self {
        self.assert_mutable();
        self.cookies.push(cookie);
        self
    }

    /// Append bytes to the body accumulator. May be called repeatedly
    /// before materialization.
    pub fn write(&mut self, bytes: &[u8]) -> &mut Self {
        self.assert_mutable();
        self.buffer.get_or_insert_with(Vec::new).extend_from_slice(bytes);
        self
    }

    /// Assign a structured body to be encoded at materialization.
    pub fn set_body(&mut self, value: serde_json::Value) -> &mut Self {
        self.assert_mutable();
        if matches!(value, serde_json::Value::String(_)) && self.headers.content_type().is_none() {
            self.headers.set(headers::CONTENT_TYPE, media::TEXT_PLAIN);
        }
        self.value = Some(value);
        self
    }

    /// Assign a plain-text body, defaulting the content type to
    /// `text/plain` when unset.
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set_body(serde_json::Value::String(text.into()))
    }

    /// True once [`materialize`](GatewayResponse::materialize) has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Convert the accumulated state into the platform-native response.
    /// Call exactly once, after all mutation is complete.
    pub fn materialize(&mut self) -> PlatformResponse {
        self.assert_mutable();
        self.finalized = true;

        let mut response = PlatformResponse::with_status(self.status, self.reason.clone());
        for (name, values) in self.headers.iter() {
            for value in values {
                response.push_header(name, value.clone());
            }
        }
        for cookie in &self.cookies {
            response.push_header(headers::SET_COOKIE, cookie.encode());
        }

        let declared = self.headers.content_type();
        if let Some(buffer) = self.buffer.take() {
            response.set_body(self.classify(buffer, declared.as_ref()));
        } else if let Some(value) = self.value.take() {
            let media_type = declared.clone().unwrap_or_else(MediaType::json);
            match self.codecs.encode(&value, &media_type) {
                Ok(bytes) => response.set_body(self.classify(bytes, declared.as_ref())),
                // No codec for the declared type: the value's string
                // representation is the last resort.
                Err(_) => {
                    let text = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    response.set_body(PlatformBody::Text(text));
                }
            }
        }
        response
    }

    fn classify(&self, bytes: Vec<u8>, content_type: Option<&MediaType>) -> PlatformBody {
        if self.classifier.is_binary(content_type) {
            PlatformBody::Binary(bytes)
        } else {
            PlatformBody::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

impl std::fmt::Debug for GatewayResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayResponse")
            .field("status", &self.status)
            .field("finalized", &self.finalized)
            .finish()
    }
}
