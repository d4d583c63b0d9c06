//! Client-side error type.

use thiserror::Error;

/// Errors produced by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request or returned a failure envelope.
    #[error("server error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response envelope, or the status text.
        message: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No session is stored; the caller must log in first.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A local state file could not be read or written.
    #[error("local state error: {0}")]
    State(#[from] std::io::Error),

    /// The WebSocket connection failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl ClientError {
    /// Build an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check whether this is an HTTP 401 from the server.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

/// Convenience alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        assert!(ClientError::api(401, "expired").is_unauthorized());
        assert!(!ClientError::api(403, "forbidden").is_unauthorized());
        assert!(!ClientError::NotAuthenticated.is_unauthorized());
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::api(404, "Task not found");
        assert_eq!(err.to_string(), "server error (404): Task not found");
    }
}
