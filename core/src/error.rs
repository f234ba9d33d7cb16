//! Error types for the MsgGO client.
//!
//! # Design
//! Three failure categories matter to callers: misuse at construction
//! (`InvalidArgument`), no usable response (`Transport`), and an explicit
//! rejection by the API (`Api`). `ApiError` is its own type so callers can
//! branch on `status_code` and `error_kind` without re-parsing text.

use serde_json::Value;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, MsggoError>;

/// Sentinel `error_kind` used when the response shape is unrecognized.
pub const MALFORMED_RESPONSE: &str = "malformed_response";

/// Errors returned by `MsggoClient`.
#[derive(Debug, Error)]
pub enum MsggoError {
    /// Caller misuse: empty API key, empty base URL, non-object payload.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport produced no response, or the response body was not JSON.
    #[error("transport error: {0}")]
    Transport(String),

    /// The event payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The API reported failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MsggoError {
    /// Returns the API error if the remote service rejected the request.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            MsggoError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// An error reported by the MsgGO API.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("MsgGO API error ({error_kind}, HTTP {status_code}): {message}")]
pub struct ApiError {
    message: String,
    status_code: u16,
    error_kind: String,
    response: Value,
}

impl ApiError {
    /// Error with the given detail and the decoded response it came from.
    pub fn new(
        message: impl Into<String>,
        status_code: u16,
        error_kind: impl Into<String>,
        response: Value,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_kind: error_kind.into(),
            response,
        }
    }

    /// The response did not carry a recognizable `ok` field.
    pub fn malformed(response: Value) -> Self {
        Self::new("Malformed response", 0, MALFORMED_RESPONSE, response)
    }

    /// Human-readable description from the response.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the rejecting response, or 0 for malformed responses.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Machine-readable identifier such as `auth_error`.
    pub fn error_kind(&self) -> &str {
        &self.error_kind
    }

    /// Whether the response shape was unrecognized.
    pub fn is_malformed(&self) -> bool {
        self.error_kind == MALFORMED_RESPONSE
    }

    /// The full decoded response body.
    pub fn response(&self) -> &Value {
        &self.response
    }

    /// A top-level field of the decoded response, if present.
    pub fn response_field(&self, field: &str) -> Option<&Value> {
        self.response.get(field)
    }
}
