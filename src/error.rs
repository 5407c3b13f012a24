//! Error taxonomy for the adapter layer.
//!
//! # Responsibilities
//! - Distinguish "body absent" from "body undecodable"
//! - Carry the decode cause without giving up `Clone` (decode results are
//!   memoized per invocation and handed to every subsequent caller)
//!
//! # Design Decisions
//! - Form-body decode failures are not represented here: they degrade to
//!   zero parameters instead of erroring
//! - An absent content type is the documented text default, not an error

use thiserror::Error;

/// Errors surfaced by request/response adaptation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Raw body bytes were requested but the inbound event carries none.
    #[error("request body is not available")]
    BodyUnavailable,

    /// The codec registry could not decode or encode a body for the
    /// negotiated media type. Never retried.
    #[error("codec failure for {media_type}: {message}")]
    Codec {
        /// The media type the codec was resolved for.
        media_type: String,
        /// Rendered cause. Kept as a string so the error stays `Clone`.
        message: String,
    },

    /// No codec is registered for the given media type.
    #[error("no codec registered for media type {0}")]
    NoCodec(String),
}

impl GatewayError {
    /// Build a codec error from a media type and any displayable cause.
    pub fn codec(media_type: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        GatewayError::Codec {
            media_type: media_type.into(),
            message: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_renders_cause() {
        let err = GatewayError::codec("application/json", "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "codec failure for application/json: unexpected end of input"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let err = GatewayError::BodyUnavailable;
        let other = err.clone();
        assert_eq!(err, other);
    }
}
