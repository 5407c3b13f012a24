//! Binary-vs-text body classification.
//!
//! # Responsibilities
//! - Decide whether a body must travel as raw bytes (base64 on the wire)
//!   or as text, given its content type
//!
//! # Design Decisions
//! - Pure function over a pattern set fixed at construction
//! - An absent content type defaults to text; this is documented platform
//!   behavior, not an error

use crate::config::schema::BinaryContentConfig;
use crate::http::media::MediaType;

/// Classifies media types as binary or text against a configured pattern
/// set. Patterns are exact essences (`application/pdf`) or top-level
/// wildcards (`image/*`).
#[derive(Debug, Clone)]
pub struct BinaryContentClassifier {
    exact: Vec<String>,
    wildcard_types: Vec<String>,
}

impl BinaryContentClassifier {
    /// Build a classifier from configuration.
    pub fn new(config: &BinaryContentConfig) -> BinaryContentClassifier {
        let mut exact = Vec::new();
        let mut wildcard_types = Vec::new();
        for pattern in &config.types {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_suffix("/*") {
                Some(main) => wildcard_types.push(main.to_string()),
                None => exact.push(pattern),
            }
        }
        BinaryContentClassifier { exact, wildcard_types }
    }

    /// True when the content type must travel as raw bytes. `None` means
    /// "treat as text".
    pub fn is_binary(&self, content_type: Option<&MediaType>) -> bool {
        let Some(mt) = content_type else {
            return false;
        };
        self.exact.iter().any(|e| mt.matches_essence(e))
            || self.wildcard_types.iter().any(|m| mt.main_type() == m)
    }
}

impl Default for BinaryContentClassifier {
    fn default() -> Self {
        BinaryContentClassifier::new(&BinaryContentConfig::default())
    }
}
