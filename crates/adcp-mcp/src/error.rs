//! MCP error types.

use std::time::Duration;

use thiserror::Error;

use crate::jsonrpc::JsonRpcError;

/// Errors that can occur while talking to an MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("HTTP {status} from {url}")]
    Http {
        status: u16,
        url: String,
        body: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Rpc(JsonRpcError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Event stream error: {0}")]
    Stream(String),

    #[error("Session is closed")]
    Closed,
}

impl McpError {
    /// The HTTP status code, if the server answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            McpError::Http { status, .. } => Some(*status),
            McpError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            McpError::Timeout(_) => true,
            McpError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Whether the server reported the method or tool as unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, McpError::Rpc(e) if e.is_not_found())
    }
}

/// Result type alias for MCP operations.
pub type McpResult<T> = Result<T, McpError>;
