//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the function gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Context path the hosting platform routes function traffic under.
    pub context_path: ContextPathConfig,

    /// Embedded dev server settings.
    pub server: ServerConfig,

    /// Binary content classification.
    pub binary: BinaryContentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Context path configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextPathConfig {
    /// Path prefix, always starting with `/`.
    pub path: String,
}

impl Default for ContextPathConfig {
    fn default() -> Self {
        Self {
            path: "/api".to_string(),
        }
    }
}

/// Embedded dev server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Binary content classification configuration.
///
/// A pattern is either an exact essence (`application/pdf`) or a top-level
/// wildcard (`image/*`). Bodies whose content type matches a pattern travel
/// as raw bytes (base64 on the wire); everything else, including requests
/// with no content type at all, travels as text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BinaryContentConfig {
    /// Media-type patterns treated as binary.
    pub types: Vec<String>,
}

impl Default for BinaryContentConfig {
    fn default() -> Self {
        Self {
            types: vec![
                "application/octet-stream".to_string(),
                "application/pdf".to_string(),
                "application/zip".to_string(),
                "application/gzip".to_string(),
                "image/*".to_string(),
                "audio/*".to_string(),
                "video/*".to_string(),
                "font/*".to_string(),
            ],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
