//! Error types for extraction
//!
//! Two layers:
//! - [`ExtractError`]: what the pipeline can report to a caller
//! - [`ModelError`]: failures at the model boundary, always absorbed into a
//!   fallback record

use std::fmt;

/// Why a model response could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// Not parseable as JSON, even after fence stripping and object search
    Parse,
    /// Parsed, but the top level is not an object
    NotObject,
    /// Required field absent, null or blank
    Missing(String),
    /// Required field present with the wrong shape or out of range
    Invalid(String),
}

impl MalformedReason {
    /// Dotted path of the offending field, if any
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Missing(path) | Self::Invalid(path) => Some(path),
            Self::Parse | Self::NotObject => None,
        }
    }
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => f.write_str("parse"),
            Self::NotObject => f.write_str("not-object"),
            Self::Missing(path) => write!(f, "missing:{path}"),
            Self::Invalid(path) => write!(f, "invalid:{path}"),
        }
    }
}

/// Extraction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Query rejected before any model call
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Model output failed structural validation
    #[error("malformed response: {0}")]
    MalformedResponse(MalformedReason),
}

impl ExtractError {
    /// Whether this is an input rejection
    #[inline]
    #[must_use]
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }
}

/// Model boundary failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No API key configured
    #[error("model API key is not configured")]
    MissingApiKey,

    /// Network failure or timeout
    #[error("transport error: {0}")]
    Transport(String),

    /// Credentials rejected
    #[error("authentication rejected (HTTP {0})")]
    Auth(u16),

    /// Rate limit or quota exhausted
    #[error("quota exceeded (HTTP {0})")]
    Quota(u16),

    /// Any other non-success status
    #[error("unexpected status: HTTP {0}")]
    Status(u16),

    /// Successful response without any text
    #[error("model returned no text")]
    EmptyResponse,

    /// Response envelope could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

impl ModelError {
    /// Map a non-success HTTP status
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth(status),
            429 => Self::Quota(status),
            _ => Self::Status(status),
        }
    }

    /// Credentials missing or rejected
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::Auth(_))
    }

    /// Rate limited
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_display() {
        assert_eq!(MalformedReason::Parse.to_string(), "parse");
        assert_eq!(MalformedReason::NotObject.to_string(), "not-object");
        assert_eq!(
            MalformedReason::Missing("location.regionCode".into()).to_string(),
            "missing:location.regionCode"
        );
        assert_eq!(
            ExtractError::MalformedResponse(MalformedReason::Invalid("summary".into())).to_string(),
            "malformed response: invalid:summary"
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ModelError::from_status(401), ModelError::Auth(401));
        assert_eq!(ModelError::from_status(403), ModelError::Auth(403));
        assert_eq!(ModelError::from_status(429), ModelError::Quota(429));
        assert_eq!(ModelError::from_status(503), ModelError::Status(503));
        assert!(ModelError::MissingApiKey.is_auth());
        assert!(ModelError::Quota(429).is_quota());
        assert!(!ModelError::EmptyResponse.is_auth());
    }
}
