//! HTTP message abstraction over platform trigger events.
//!
//! # Data Flow
//! ```text
//! platform event
//!     → headers.rs (flat map → case-insensitive multi-value store)
//!     → request.rs (lazy cookies / parameters / attributes / body)
//!     → [application handler writes into response.rs]
//!     → response.rs materialize (binary classification, cookie flush)
//!     → platform-native response
//! ```

pub mod binary;
pub mod cookies;
pub mod headers;
pub mod media;
pub mod params;
pub mod request;
pub mod response;

pub use binary::BinaryContentClassifier;
pub use cookies::{Cookie, CookieJar, SameSite};
pub use headers::Headers;
pub use media::MediaType;
pub use params::Parameters;
pub use request::{Attributes, BodyValue, GatewayRequest};
pub use response::GatewayResponse;

/// HTTP request method. Unknown names are preserved verbatim rather than
/// rejected, mirroring how platforms deliver custom methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
    Trace,
    Custom(String),
}

impl Method {
    /// Parse a method name, case-insensitively for the standard set.
    pub fn parse(name: &str) -> Method {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            "TRACE" => Method::Trace,
            _ => Method::Custom(name.to_string()),
        }
    }

    /// Canonical name; custom methods keep their delivered spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
            Method::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_methods_case_insensitive() {
        assert_eq!(Method::parse("get"), Method::Get);
        assert_eq!(Method::parse("POST"), Method::Post);
    }

    #[test]
    fn test_custom_method_preserved() {
        let method = Method::parse("PURGE");
        assert_eq!(method, Method::Custom("PURGE".to_string()));
        assert_eq!(method.as_str(), "PURGE");
    }
}
