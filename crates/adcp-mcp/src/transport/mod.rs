//! MCP transports.
//!
//! Two wire transports exist. Streamable HTTP posts every JSON-RPC message to
//! one endpoint and reads either a JSON body or a short event stream back.
//! The legacy SSE transport keeps a long-lived event stream open, learns the
//! POST endpoint from its first `endpoint` event, and delivers responses over
//! that stream.

pub mod sse;
pub mod streamable;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::McpResult;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

pub use sse::SseTransport;
pub use streamable::StreamableHttpTransport;

/// Header carrying the session id on streamable HTTP.
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// A bidirectional JSON-RPC channel to one MCP server.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Send a request and wait for its response.
    async fn request(&self, request: JsonRpcRequest) -> McpResult<JsonRpcResponse>;

    /// Send a notification; no response is expected.
    async fn notify(&self, notification: JsonRpcRequest) -> McpResult<()>;

    /// Release server-side and local resources. Safe to call repeatedly.
    async fn close(&self) -> McpResult<()>;

    /// The URL requests are posted to.
    fn endpoint(&self) -> &str;
}

/// Which transport to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    #[default]
    StreamableHttp,
    Sse,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::StreamableHttp => write!(f, "streamable_http"),
            TransportKind::Sse => write!(f, "sse"),
        }
    }
}

/// Per-connection settings shared by both transports.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Extra headers sent with every request (authentication).
    pub headers: Vec<(String, String)>,
    /// Bound on every exchange.
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportOptions {
    pub(crate) fn apply(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

/// Open a transport of the given kind against `url`.
pub async fn connect(
    kind: TransportKind,
    http: Client,
    url: &str,
    options: TransportOptions,
) -> McpResult<Box<dyn McpTransport>> {
    match kind {
        TransportKind::StreamableHttp => {
            Ok(Box::new(StreamableHttpTransport::new(http, url, options)?))
        }
        TransportKind::Sse => Ok(Box::new(SseTransport::connect(http, url, options).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_serde() {
        assert_eq!(
            serde_json::to_value(TransportKind::StreamableHttp).unwrap(),
            "streamable_http"
        );
        let kind: TransportKind = serde_json::from_value("sse".into()).unwrap();
        assert_eq!(kind, TransportKind::Sse);
        assert_eq!(TransportKind::default().to_string(), "streamable_http");
    }
}
