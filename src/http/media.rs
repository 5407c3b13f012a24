//! Media type parsing and comparison.
//!
//! # Responsibilities
//! - Parse `type/subtype; param=value` content types
//! - Compare by essence (case-insensitive `type/subtype`)
//! - Answer the two questions the adapter cares about: is this a form
//!   submission, and does it use a `+json` structured syntax

use std::fmt;

/// A parsed media type.
///
/// Parameters other than `charset` are retained verbatim but not
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    charset: Option<String>,
    raw: String,
}

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

impl MediaType {
    /// Parse a content-type value such as `text/html; charset=utf-8`.
    ///
    /// The essence (`type/subtype`) is lowercased; an empty or slash-less
    /// value yields `None`.
    pub fn parse(value: &str) -> Option<MediaType> {
        let raw = value.trim();
        if raw.is_empty() {
            return None;
        }
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        if !essence.contains('/') {
            return None;
        }
        let mut charset = None;
        for param in parts {
            if let Some((name, val)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("charset") {
                    charset = Some(val.trim().trim_matches('"').to_ascii_lowercase());
                }
            }
        }
        Some(MediaType {
            essence,
            charset,
            raw: raw.to_string(),
        })
    }

    /// The application/json media type.
    pub fn json() -> MediaType {
        MediaType::parse(APPLICATION_JSON).unwrap()
    }

    /// The text/plain media type.
    pub fn text_plain() -> MediaType {
        MediaType::parse(TEXT_PLAIN).unwrap()
    }

    /// Lowercased `type/subtype` without parameters.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// The `charset` parameter, lowercased, if present.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// The top-level type, e.g. `image` for `image/png`.
    pub fn main_type(&self) -> &str {
        self.essence.split('/').next().unwrap_or(&self.essence)
    }

    /// True for URL-encoded and multipart form submissions.
    pub fn is_form_submission(&self) -> bool {
        self.essence == FORM_URLENCODED || self.essence == MULTIPART_FORM_DATA
    }

    /// True for `application/json` and `+json` structured syntaxes such as
    /// `application/problem+json`.
    pub fn has_json_nature(&self) -> bool {
        self.essence == APPLICATION_JSON || self.essence.ends_with("+json")
    }

    /// Compare against a bare essence string.
    pub fn matches_essence(&self, essence: &str) -> bool {
        self.essence.eq_ignore_ascii_case(essence)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
