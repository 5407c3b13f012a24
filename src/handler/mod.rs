//! Invocation entry point.
//!
//! # Responsibilities
//! - One-time process-wide setup (codec registry, binary classifier),
//!   shared by reference across invocations
//! - Per-invocation adapter construction and error-to-status mapping
//!
//! # Design Decisions
//! - No static state: the host owns everything expensive and is passed
//!   into each invocation, so cold start cost is paid exactly once and
//!   tests can run hosts side by side
//! - Handler errors never escape as panics; they become error responses
//!   with the failure logged against the invocation id

pub mod context;

use std::sync::Arc;

use crate::codec::CodecRegistry;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::event::{InboundEvent, PlatformResponse};
use crate::http::binary::BinaryContentClassifier;
use crate::http::request::GatewayRequest;
use crate::http::response::GatewayResponse;

pub use context::FunctionContext;

/// Application logic invoked for each adapted request.
///
/// Handlers must leave materialization to the host.
pub trait Handler: Send + Sync {
    fn handle(
        &self,
        request: &GatewayRequest,
        response: &mut GatewayResponse,
    ) -> Result<(), GatewayError>;
}

impl<F> Handler for F
where
    F: Fn(&GatewayRequest, &mut GatewayResponse) -> Result<(), GatewayError> + Send + Sync,
{
    fn handle(
        &self,
        request: &GatewayRequest,
        response: &mut GatewayResponse,
    ) -> Result<(), GatewayError> {
        self(request, response)
    }
}

/// Process-wide invocation host. Construct once at startup; `handle` is
/// then safe to call from any number of invocations concurrently.
pub struct FunctionHost {
    config: Arc<GatewayConfig>,
    codecs: Arc<CodecRegistry>,
    classifier: Arc<BinaryContentClassifier>,
    handler: Arc<dyn Handler>,
}

impl FunctionHost {
    /// Host with the default codec registry.
    pub fn new(config: GatewayConfig, handler: impl Handler + 'static) -> FunctionHost {
        FunctionHost::with_codecs(config, CodecRegistry::with_defaults(), handler)
    }

    /// Host with an explicit codec registry, for applications registering
    /// their own codecs.
    pub fn with_codecs(
        config: GatewayConfig,
        codecs: CodecRegistry,
        handler: impl Handler + 'static,
    ) -> FunctionHost {
        let classifier = BinaryContentClassifier::new(&config.binary);
        FunctionHost {
            config: Arc::new(config),
            codecs: Arc::new(codecs),
            classifier: Arc::new(classifier),
            handler: Arc::new(handler),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn codecs(&self) -> &Arc<CodecRegistry> {
        &self.codecs
    }

    /// Adapt one platform event, run the application handler, and
    /// materialize the platform-native response.
    pub fn handle(&self, event: InboundEvent, context: FunctionContext) -> PlatformResponse {
        let request = GatewayRequest::new(
            event,
            context,
            Arc::clone(&self.codecs),
            Arc::clone(&self.classifier),
        );
        let mut response = GatewayResponse::new(Arc::clone(&self.codecs), Arc::clone(&self.classifier));

        tracing::debug!(
            invocation_id = %request.context().invocation_id(),
            method = %request.method(),
            path = %request.path(),
            "Handling invocation"
        );

        match self.handler.handle(&request, &mut response) {
            Ok(()) => response.materialize(),
            Err(err) => {
                tracing::error!(
                    invocation_id = %request.context().invocation_id(),
                    error = %err,
                    "Handler failed"
                );
                self.error_response(&err)
            }
        }
    }

    /// Fresh error response; the handler's partial state is discarded.
    fn error_response(&self, err: &GatewayError) -> PlatformResponse {
        let status = match err {
            GatewayError::BodyUnavailable => 400,
            GatewayError::Codec { .. } => 400,
            GatewayError::NoCodec(_) => 415,
        };
        let mut response =
            GatewayResponse::new(Arc::clone(&self.codecs), Arc::clone(&self.classifier));
        response.status(status);
        response.set_text(err.to_string());
        response.materialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBuilder;
    use serde_json::json;

    fn host(handler: impl Handler + 'static) -> FunctionHost {
        FunctionHost::new(GatewayConfig::default(), handler)
    }

    #[test]
    fn test_echo_invocation() {
        let host = host(
            |request: &GatewayRequest, response: &mut GatewayResponse| -> Result<(), GatewayError> {
                response.set_text(format!("{} {}", request.method(), request.path()));
                Ok(())
            },
        );
        let native = host.handle(
            EventBuilder::new("GET", "/api/echo").build(),
            FunctionContext::new_invocation("echo"),
        );
        assert_eq!(native.status_code(), 200);
        assert_eq!(native.body_text(), Some("GET /api/echo"));
    }

    #[test]
    fn test_codec_failure_maps_to_400() {
        let host = host(
            |request: &GatewayRequest, _response: &mut GatewayResponse| -> Result<(), GatewayError> {
                request.body()?;
                Ok(())
            },
        );
        let native = host.handle(
            EventBuilder::new("POST", "/api/pets")
                .header("Content-Type", "application/json")
                .body_text("{broken")
                .build(),
            FunctionContext::new_invocation("pets"),
        );
        assert_eq!(native.status_code(), 400);
    }

    #[test]
    fn test_missing_codec_maps_to_415() {
        let host = host(
            |request: &GatewayRequest, _response: &mut GatewayResponse| -> Result<(), GatewayError> {
                request.body()?;
                Ok(())
            },
        );
        let native = host.handle(
            EventBuilder::new("POST", "/api/pets")
                .header("Content-Type", "application/msgpack")
                .body_text("xx")
                .build(),
            FunctionContext::new_invocation("pets"),
        );
        assert_eq!(native.status_code(), 415);
    }

    #[test]
    fn test_structured_response_body() {
        let host = host(
            |_request: &GatewayRequest, response: &mut GatewayResponse| -> Result<(), GatewayError> {
                response.content_type("application/json");
                response.set_body(json!({"name": "Dino", "age": 12}));
                Ok(())
            },
        );
        let native = host.handle(
            EventBuilder::new("GET", "/api/pets/1").build(),
            FunctionContext::new_invocation("pets"),
        );
        let value: serde_json::Value = serde_json::from_str(native.body_text().unwrap()).unwrap();
        assert_eq!(value, json!({"name": "Dino", "age": 12}));
    }
}
