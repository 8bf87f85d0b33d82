//! A2A error types.

use thiserror::Error;

/// Errors that can occur when talking to an A2A agent.
#[derive(Debug, Error)]
pub enum A2AError {
    /// Failed to fetch the agent card at the well-known endpoint.
    #[error("agent discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The agent card could not be parsed.
    #[error("invalid agent card: {0}")]
    InvalidAgentCard(String),

    /// The agent answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Http {
        status: u16,
        url: String,
        body: Option<String>,
    },

    /// HTTP transport error (connect, TLS, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The reply body did not match the task envelope.
    #[error("malformed task reply: {0}")]
    MalformedReply(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Timeout waiting for the agent.
    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl A2AError {
    /// HTTP status code, if the agent answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            A2AError::Http { status, .. } => Some(*status),
            A2AError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the agent rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Whether the configured timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            A2AError::Timeout(_) => true,
            A2AError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// A2A Result type alias.
pub type A2AResult<T> = Result<T, A2AError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_classification() {
        let err = A2AError::Http {
            status: 403,
            url: "https://agent.example.com/message/send".into(),
            body: None,
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "HTTP 403 from https://agent.example.com/message/send");
    }

    #[test]
    fn test_timeout_classification() {
        let err = A2AError::Timeout(std::time::Duration::from_secs(5));
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }
}
