//! Error types for the MyAnimeList client.
//!
//! Every failure is returned to the caller once. Nothing is retried and the
//! client stays usable after any of these.

use serde::Deserialize;
use thiserror::Error;

/// Result alias used throughout the client
pub type Result<T> = std::result::Result<T, MalError>;

/// Top-level client error type.
#[derive(Error, Debug)]
pub enum MalError {
    /// A required construction field was missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// DNS, connect, TLS or timeout failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected JSON shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Well-formed non-200 response carrying the provider's error envelope.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The requested paging direction has no URL.
    #[error("There are no more pages in this direction")]
    NoMorePages,

    /// Authorization code exchange attempted without a pending PKCE verifier.
    #[error("No pending authorization flow; build an authorization URL first")]
    MissingVerifier,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Input rejected before any request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MalError {
    /// Returns the provider error if this is an API error.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            MalError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// True when a paging call ran past the first or last page.
    pub fn is_end_of_pages(&self) -> bool {
        matches!(self, MalError::NoMorePages)
    }
}

/// Error envelope returned by the API for any non-200 status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("myanimelist returned error `{error}` (HTTP {status}): {message}")]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// Provider error code, e.g. `not_found`
    pub error: String,
    /// Human-readable message, empty when the provider sent none
    pub message: String,
}

/// Wire shape of the error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorEnvelope {
    pub(crate) fn into_api_error(self, status: u16) -> ApiError {
        ApiError {
            status,
            error: self.error,
            message: self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_message() {
        let envelope: ErrorEnvelope = serde_json::from_str(r#"{"error":"invalid_token"}"#).unwrap();
        let err = envelope.into_api_error(401);
        assert_eq!(err.error, "invalid_token");
        assert_eq!(err.message, "");
        assert_eq!(err.status, 401);
    }

    #[test]
    fn test_api_error_is_distinguishable() {
        let err: MalError = ApiError {
            status: 404,
            error: "not_found".to_string(),
            message: "no such id".to_string(),
        }
        .into();

        assert_eq!(err.as_api().map(|e| e.error.as_str()), Some("not_found"));
        assert!(!err.is_end_of_pages());
        assert!(MalError::NoMorePages.is_end_of_pages());
        assert!(MalError::NoMorePages.as_api().is_none());
    }
}
