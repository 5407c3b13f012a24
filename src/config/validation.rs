//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Returns all
//! validation errors, not just the first; validation is a pure function
//! and runs before a config is accepted into the system.

use std::fmt;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn error(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a configuration, collecting every failure.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.context_path.path.starts_with('/') {
        errors.push(error("context_path.path", "must start with '/'"));
    }

    if config.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(error(
            "server.bind_address",
            format!("'{}' is not a valid socket address", config.server.bind_address),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(error("server.request_timeout_secs", "must be greater than zero"));
    }

    for pattern in &config.binary.types {
        if !valid_binary_pattern(pattern) {
            errors.push(error(
                "binary.types",
                format!("'{pattern}' is not an essence or a 'type/*' wildcard"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A pattern is `type/subtype` or `type/*`; both sides must be non-empty
/// and the wildcard only valid on the subtype side.
fn valid_binary_pattern(pattern: &str) -> bool {
    match pattern.split_once('/') {
        Some((main, sub)) => {
            !main.is_empty() && main != "*" && (!sub.is_empty()) && !sub.contains('/')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::GatewayConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.context_path.path = "api".to_string();
        config.server.bind_address = "nonsense".to_string();
        config.binary.types.push("*/*".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_binary_pattern_shapes() {
        assert!(valid_binary_pattern("image/*"));
        assert!(valid_binary_pattern("application/pdf"));
        assert!(!valid_binary_pattern("image"));
        assert!(!valid_binary_pattern("*/*"));
        assert!(!valid_binary_pattern("image/"));
    }
}
