use thiserror::Error;

/// Errors from the marketplace REST collaborators (history, profile, rooms).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered 401: the credential is expired or invalid.
    #[error("authorization failed")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend returned a `success: false` envelope.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Errors from the realtime transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The handshake was refused with 401.
    #[error("connection refused: unauthorized")]
    Unauthorized,

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed")]
    Closed,

    #[error("invalid socket url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, TransportError::Unauthorized)
    }
}

/// Reasons a send was rejected. A rejected send has no side effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("local participant is unknown")]
    UnknownParticipant,

    #[error("connection is not open")]
    NotOpen,

    #[error("outbound queue is full")]
    Backpressure,

    #[error("failed to encode frame: {0}")]
    Encode(String),
}

/// Errors opening a chat session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No credential was available at session start.
    #[error("no credential available; sign in first")]
    MissingCredential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert!(!err.is_auth_failure());
        assert!(ApiError::Unauthorized.is_auth_failure());
    }

    #[test]
    fn test_transport_error_auth() {
        assert!(TransportError::Unauthorized.is_auth_failure());
        assert!(!TransportError::Closed.is_auth_failure());
    }

    #[test]
    fn test_send_error_display() {
        assert_eq!(SendError::NotOpen.to_string(), "connection is not open");
    }
}
