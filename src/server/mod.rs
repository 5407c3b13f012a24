//! Embedded HTTP server for local development and integration testing.
//!
//! # Responsibilities
//! - Accept real HTTP traffic and flatten it into the platform event shape
//!   (comma-joined repeated headers, flat query map, base64 binary bodies)
//! - Invoke a [`FunctionHost`] exactly as the hosting platform would
//! - Replay the materialized response (status, ordered headers, body)
//!
//! # Design Decisions
//! - A catch-all route keeps the bridge transparent; path handling belongs
//!   to the application handler
//! - Bodies are buffered; trigger payloads are small by platform contract

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashMap;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::event::{InboundEvent, PlatformBody, PlatformResponse};
use crate::handler::{FunctionContext, FunctionHost};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// HTTP server wrapping a function host.
pub struct EmbeddedServer {
    router: Router,
}

impl EmbeddedServer {
    /// Create a server for the given host.
    pub fn new(host: Arc<FunctionHost>) -> EmbeddedServer {
        let timeout = Duration::from_secs(host.config().server.request_timeout_secs);
        let router = Router::new()
            .route("/{*path}", any(bridge_handler))
            .route("/", any(bridge_handler))
            .with_state(host)
            .layer(TimeoutLayer::new(timeout))
            .layer(TraceLayer::new_for_http());
        EmbeddedServer { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Embedded server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Embedded server stopped");
        Ok(())
    }
}

/// Flatten the HTTP request, invoke the host, replay the response.
async fn bridge_handler(
    State(host): State<Arc<FunctionHost>>,
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();

    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in parts.headers.iter() {
        let Ok(value) = value.to_str() else { continue };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let mut query_parameters: HashMap<String, String> = HashMap::new();
    if let Some(query) = parts.uri.query() {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            query_parameters
                .entry(name.into_owned())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
    }

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let (body, is_base64_encoded) = if bytes.is_empty() {
        (None, false)
    } else {
        match std::str::from_utf8(&bytes) {
            Ok(text) => (Some(text.to_string()), false),
            Err(_) => (Some(BASE64.encode(&bytes)), true),
        }
    };

    let event = InboundEvent {
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        headers,
        query_parameters,
        body,
        is_base64_encoded,
    };

    let context = FunctionContext::new_invocation("embedded-server");
    let native = host.handle(event, context);
    replay(native)
}

/// Convert the platform-native response back into a real HTTP response.
fn replay(native: PlatformResponse) -> Response {
    let status =
        StatusCode::from_u16(native.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match native.body() {
        Some(PlatformBody::Text(text)) => Body::from(text.clone()),
        Some(PlatformBody::Binary(bytes)) => Body::from(bytes.clone()),
        None => Body::empty(),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    for (name, value) in native.headers() {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else { continue };
        let Ok(value) = HeaderValue::from_str(value) else { continue };
        response.headers_mut().append(name, value);
    }
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
