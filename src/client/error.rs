//! Error types for the chat client.

use thiserror::Error;

/// Ways a backend exchange can fail. Every variant is a transport failure
/// from the session's point of view and maps to the same fallback reply.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure, including timeouts.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The body was not a valid chat response.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint URL could not be built.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ClientError {
    /// Whether the failure happened before the backend produced a reply.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status of the failed exchange, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
