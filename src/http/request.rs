//! Inbound request adaptation.
//!
//! # Responsibilities
//! - Adapt one platform event into the normalized request abstraction
//! - Build cookies, parameters, attributes, and the decoded body lazily,
//!   at most once, safely under concurrent first access
//! - Expose raw body bytes with base64 decoding where the platform flag or
//!   the binary classifier says the payload is binary
//!
//! # Design Decisions
//! - Lazy fields live in one-shot cells: the first thread to arrive
//!   computes the value while others wait on the cell, so nothing is
//!   computed twice and no half-built value is published
//! - Decode failures are memoized too; a malformed body is not transient,
//!   so every later caller gets the same error back

use std::any::Any;
use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dashmap::DashMap;
use serde::de::DeserializeOwned;

use crate::codec::CodecRegistry;
use crate::error::GatewayError;
use crate::event::InboundEvent;
use crate::handler::context::FunctionContext;
use crate::http::binary::BinaryContentClassifier;
use crate::http::cookies::CookieJar;
use crate::http::headers::{self, Headers};
use crate::http::media::MediaType;
use crate::http::params::Parameters;
use crate::http::Method;

/// Mutable, concurrency-safe map of per-invocation values, for
/// filter-style stages to pass state along without touching the event.
#[derive(Default)]
pub struct Attributes {
    map: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Attributes {
    /// Store a value under a name, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.map.insert(name.into(), Arc::new(value));
    }

    /// Fetch a value by name and type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let entry = self.map.get(name)?;
        Arc::clone(entry.value()).downcast::<T>().ok()
    }

    /// Remove a value. Returns true when something was removed.
    pub fn remove(&self, name: &str) -> bool {
        self.map.remove(name).is_some()
    }

    /// Names currently present.
    pub fn names(&self) -> Vec<String> {
        self.map.iter().map(|e| e.key().clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attributes").field("len", &self.map.len()).finish()
    }
}

/// The decoded request body, memoized per invocation.
#[derive(Debug, Clone)]
pub enum BodyValue {
    /// Form submissions resolve to the parameter view; the codec registry
    /// is not consulted for them.
    Form(Arc<Parameters>),
    /// Anything else is decoded through the codec registry into the
    /// interchange value.
    Structured(Arc<serde_json::Value>),
}

/// Normalized, read-mostly view of one inbound invocation.
///
/// Method, URI, and headers are computed eagerly from the event; cookies,
/// parameters, attributes, and the body are computed on first access and
/// cached for the lifetime of the request.
pub struct GatewayRequest {
    event: InboundEvent,
    context: FunctionContext,
    method: Method,
    path: String,
    headers: Headers,
    codecs: Arc<CodecRegistry>,
    classifier: Arc<BinaryContentClassifier>,
    cookies: OnceLock<CookieJar>,
    parameters: OnceLock<Arc<Parameters>>,
    attributes: OnceLock<Attributes>,
    raw_body: OnceLock<Result<Vec<u8>, GatewayError>>,
    body: OnceLock<Result<BodyValue, GatewayError>>,
}

impl GatewayRequest {
    /// Adapt a platform event. Called once per invocation by the host.
    pub fn new(
        event: InboundEvent,
        context: FunctionContext,
        codecs: Arc<CodecRegistry>,
        classifier: Arc<BinaryContentClassifier>,
    ) -> GatewayRequest {
        let method = Method::parse(&event.method);
        let path = event.path().to_string();
        let headers = Headers::from_flat(&event.headers);
        GatewayRequest {
            event,
            context,
            method,
            path,
            headers,
            codecs,
            classifier,
            cookies: OnceLock::new(),
            parameters: OnceLock::new(),
            attributes: OnceLock::new(),
            raw_body: OnceLock::new(),
            body: OnceLock::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The method name exactly as the platform delivered it.
    pub fn method_name(&self) -> &str {
        &self.event.method
    }

    /// The full request URI.
    pub fn uri(&self) -> &str {
        &self.event.uri
    }

    /// The path component of the URI.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The per-invocation correlation handle.
    pub fn context(&self) -> &FunctionContext {
        &self.context
    }

    /// The raw platform event.
    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    /// Parsed `Content-Type`, or the platform default of
    /// `application/json` when absent.
    pub fn content_type(&self) -> MediaType {
        self.headers.content_type().unwrap_or_else(MediaType::json)
    }

    /// Cookies applicable to this request's path. Computed on first
    /// access.
    pub fn cookies(&self) -> &CookieJar {
        self.cookies.get_or_init(|| {
            match self.headers.get(headers::COOKIE) {
                Some(value) => CookieJar::decode(value, &self.path),
                None => CookieJar::default(),
            }
        })
    }

    /// Query parameters, merged with form-body parameters for form
    /// submissions. Computed on first access.
    pub fn parameters(&self) -> &Parameters {
        self.parameters_arc()
    }

    fn parameters_arc(&self) -> &Arc<Parameters> {
        self.parameters.get_or_init(|| {
            let content_type = self.headers.content_type();
            let is_urlencoded = content_type
                .as_ref()
                .map(|mt| mt.matches_essence(crate::http::media::FORM_URLENCODED))
                .unwrap_or(false);
            let body = if is_urlencoded {
                self.raw_bytes().ok().map(|b| b.to_vec())
            } else {
                None
            };
            Arc::new(Parameters::resolve(
                &self.event.query_parameters,
                body.as_deref(),
                content_type.as_ref(),
            ))
        })
    }

    /// Per-invocation attribute map. Computed on first access.
    pub fn attributes(&self) -> &Attributes {
        self.attributes.get_or_init(Attributes::default)
    }

    /// The body as raw bytes, base64-decoded when the platform flag or the
    /// binary classifier marks the payload binary.
    ///
    /// Returns [`GatewayError::BodyUnavailable`] when the event carries no
    /// body at all.
    pub fn raw_bytes(&self) -> Result<&[u8], GatewayError> {
        self.raw_body
            .get_or_init(|| self.decode_raw())
            .as_ref()
            .map(Vec::as_slice)
            .map_err(Clone::clone)
    }

    fn decode_raw(&self) -> Result<Vec<u8>, GatewayError> {
        let text = self.event.body.as_ref().ok_or(GatewayError::BodyUnavailable)?;
        if self.event.is_base64_encoded {
            // The platform said so; a decode failure is a broken event.
            return BASE64
                .decode(text.trim())
                .map_err(|e| GatewayError::codec(self.content_type().essence(), e));
        }
        if self.classifier.is_binary(self.headers.content_type().as_ref()) {
            // Classifier-only indication is a heuristic; fall back to the
            // literal bytes when the text is not actually base64.
            if let Ok(bytes) = BASE64.decode(text.trim()) {
                return Ok(bytes);
            }
        }
        Ok(text.clone().into_bytes())
    }

    /// The body as text.
    pub fn body_string(&self) -> Result<String, GatewayError> {
        Ok(String::from_utf8_lossy(self.raw_bytes()?).into_owned())
    }

    /// The decoded body. Form submissions short-circuit to the parameter
    /// view; everything else goes through the codec registry keyed by
    /// content type (default `application/json`). Computed on first
    /// access; failures are memoized and returned to every caller.
    pub fn body(&self) -> Result<BodyValue, GatewayError> {
        self.body.get_or_init(|| self.decode_body()).clone()
    }

    fn decode_body(&self) -> Result<BodyValue, GatewayError> {
        let content_type = self.content_type();
        if content_type.is_form_submission() {
            return Ok(BodyValue::Form(Arc::clone(self.parameters_arc())));
        }
        let bytes = self.raw_bytes()?;
        let value = self.codecs.decode(bytes, &content_type)?;
        Ok(BodyValue::Structured(Arc::new(value)))
    }

    /// Typed view over the memoized body.
    ///
    /// Structured bodies deserialize from the interchange value; form
    /// submissions bind from a map of first parameter values, so targets
    /// should use string fields for form data.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        let essence = self.content_type().essence().to_string();
        let value = match self.body()? {
            BodyValue::Structured(value) => (*value).clone(),
            BodyValue::Form(params) => {
                let mut map = serde_json::Map::new();
                for (name, values) in params.iter() {
                    if let Some(first) = values.first() {
                        map.insert(name.to_string(), serde_json::Value::String(first.clone()));
                    }
                }
                serde_json::Value::Object(map)
            }
        };
        serde_json::from_value(value).map_err(|e| GatewayError::codec(essence, e))
    }
}

impl std::fmt::Debug for GatewayRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRequest")
            .field("method", &self.method)
            .field("uri", &self.event.uri)
            .field("invocation_id", &self.context.invocation_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBuilder;
    use serde::Deserialize;
    use serde_json::json;

    fn request(event: InboundEvent) -> GatewayRequest {
        GatewayRequest::new(
            event,
            FunctionContext::new_invocation("test-function"),
            Arc::new(CodecRegistry::with_defaults()),
            Arc::new(BinaryContentClassifier::default()),
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    #[test]
    fn test_eager_fields() {
        let req = request(
            EventBuilder::new("post", "https://example.com/api/pets?limit=5")
                .header("CONTENT_TYPE", "application/json")
                .build(),
        );
        assert_eq!(*req.method(), Method::Post);
        assert_eq!(req.method_name(), "post");
        assert_eq!(req.path(), "/api/pets");
        assert_eq!(req.headers().get("content-type"), Some("application/json"));
    }

    #[test]
    fn test_json_body_decodes_into_record() {
        let req = request(
            EventBuilder::new("POST", "/api/pets")
                .body_json(&json!({"name": "Dino", "age": 12}))
                .build(),
        );
        let person: Person = req.body_as().unwrap();
        assert_eq!(
            person,
            Person {
                name: "Dino".to_string(),
                age: 12
            }
        );
    }

    #[test]
    fn test_body_decode_failure_is_memoized() {
        let req = request(
            EventBuilder::new("POST", "/api/pets")
                .header("Content-Type", "application/json")
                .body_text("{not json")
                .build(),
        );
        let first = req.body().unwrap_err();
        let second = req.body().unwrap_err();
        assert!(matches!(first, GatewayError::Codec { .. }));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_body_is_unavailable() {
        let req = request(EventBuilder::new("GET", "/api/pets").build());
        assert_eq!(req.raw_bytes().unwrap_err(), GatewayError::BodyUnavailable);
    }

    #[test]
    fn test_base64_flagged_body_decodes() {
        let req = request(EventBuilder::new("POST", "/api/upload").body_bytes(&[1, 2, 3]).build());
        assert_eq!(req.raw_bytes().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_form_body_short_circuits_to_parameters() {
        let req = request(
            EventBuilder::new("POST", "/api/form")
                .query("q", "s")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body_text("a=1&b=2")
                .build(),
        );
        match req.body().unwrap() {
            BodyValue::Form(params) => {
                assert_eq!(params.get_first("a"), Some("1"));
                assert_eq!(params.get_first("b"), Some("2"));
                assert_eq!(params.get_first("q"), Some("s"));
            }
            other => panic!("expected form body, got {other:?}"),
        }
    }

    #[test]
    fn test_cookies_filtered_by_path() {
        let req = request(
            EventBuilder::new("GET", "/api/pets")
                .header("Cookie", "keep=1; drop=2; $Path=/admin")
                .build(),
        );
        assert_eq!(req.cookies().get_value("keep"), Some("1"));
        assert!(req.cookies().get("drop").is_none());
    }

    #[test]
    fn test_attributes_typed_round_trip() {
        let req = request(EventBuilder::new("GET", "/api").build());
        req.attributes().set("count", 7u32);
        assert_eq!(req.attributes().get::<u32>("count").as_deref(), Some(&7));
        assert!(req.attributes().get::<String>("count").is_none());
        assert!(req.attributes().remove("count"));
    }
}
