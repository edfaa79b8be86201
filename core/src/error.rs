//! Error types for the Volley API client.
//!
//! # Design
//! Each stage of the request pipeline fails with its own variant so callers
//! can tell a request that never left the process (`InvalidUrl`,
//! `Serialization`) from one that never reached the server (`Transport`) or
//! one the server rejected (`Api`). Error responses whose body is not the
//! standard `{"error", "message"}` envelope land in `UnexpectedResponse`
//! with the status and raw body kept verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error envelope returned by the Volley API on 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code, e.g. `"unauthorized"`.
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP status of the response that carried this error.
    #[serde(skip)]
    pub status: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message.as_deref().filter(|m| !m.is_empty()) {
            Some(message) => write!(f, "API error (status {}): {} - {message}", self.status, self.error),
            None => write!(f, "API error (status {}): {}", self.status, self.error),
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors returned by `VolleyClient` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Client configuration could not be assembled, e.g. a missing or
    /// unparseable environment variable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The base URL and path did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a structured error envelope.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server answered with an error status and a body that is not an
    /// error envelope.
    #[error("API error (status {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// A success response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Deserialization(String),

    /// Webhook ingestion answered with something other than 202 Accepted.
    #[error("unexpected status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl Error {
    pub(crate) fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    /// HTTP status of the response behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            Error::UnexpectedResponse { status, .. } | Error::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The structured server error, if the response carried one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_message_when_present() {
        let err = ApiError {
            error: "not_found".to_string(),
            message: Some("source 7 does not exist".to_string()),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "API error (status 404): not_found - source 7 does not exist"
        );
    }

    #[test]
    fn api_error_status_is_not_serialized() {
        let err = ApiError {
            error: "unauthorized".to_string(),
            message: None,
            status: 401,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "unauthorized" }));
    }

    #[test]
    fn status_accessor_covers_response_variants() {
        let fallback = Error::UnexpectedResponse {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(fallback.status(), Some(502));
        assert!(fallback.api_error().is_none());

        let serialization = Error::Serialization("key must be a string".to_string());
        assert_eq!(serialization.status(), None);
    }

    #[test]
    fn transport_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::transport(io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("refused"));
    }
}
