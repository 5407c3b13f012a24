//! Serverless HTTP trigger gateway.
//!
//! Adapts a hosting platform's flattened HTTP trigger event (single-valued
//! comma-joined headers, flat query map, optional textual or base64 body)
//! into a case-insensitive, multi-value, lazily-computed request/response
//! abstraction, and translates the result back into the platform's native
//! response shape.
//!
//! # Architecture Overview
//!
//! ```text
//! platform event ──▶ GatewayRequest ──▶ application Handler ──▶ GatewayResponse
//!                    (headers, cookies,                         (status, headers,
//!                     parameters, body)                          cookies, body)
//!                                                                    │
//!                                              PlatformResponse ◀────┘ materialize
//! ```
//!
//! The [`handler::FunctionHost`] owns the process-wide pieces (codec
//! registry, binary classifier, configuration) and builds one adapter pair
//! per invocation. The [`server::EmbeddedServer`] bridges real HTTP
//! traffic to a host for local development and tests.

// Core subsystems
pub mod codec;
pub mod config;
pub mod event;
pub mod http;

// Invocation plumbing
pub mod handler;
pub mod server;

// Cross-cutting concerns
pub mod error;
pub mod observability;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use event::{EventBuilder, InboundEvent, PlatformBody, PlatformResponse};
pub use handler::{FunctionContext, FunctionHost, Handler};
pub use http::{GatewayRequest, GatewayResponse};
