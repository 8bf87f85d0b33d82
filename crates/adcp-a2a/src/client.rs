//! A2A Client — a thin HTTP client for AdCP agents speaking A2A.
//!
//! The client owns a pooled `reqwest::Client` that is reused across calls,
//! bounds the number of requests in flight, and attaches the configured
//! authentication header to every request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tokio::sync::Semaphore;
use url::Url;

use crate::agent_card::{AgentCard, WELL_KNOWN_AGENT_CARD_PATH};
use crate::error::{A2AError, A2AResult};
use crate::message::Message;
use crate::task::TaskReply;

/// Path of the message-send endpoint relative to the agent's base URI.
pub const MESSAGE_SEND_PATH: &str = "/message/send";

/// Placeholder written in place of credentials in debug captures.
pub const REDACTED: &str = "***";

/// Connection pool limits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of requests in flight through this client.
    pub max_connections: usize,
    /// Maximum idle keep-alive connections kept per host.
    pub max_idle_per_host: usize,
    /// How long an idle connection is kept alive.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for one A2A agent.
#[derive(Debug, Clone)]
pub struct A2AClient {
    /// Base URL of the remote agent, without a trailing slash.
    base_url: String,

    /// Pooled HTTP client.
    http: Client,

    /// Bounds concurrent requests.
    permits: Arc<Semaphore>,

    /// Authentication header name and value.
    auth: Option<(String, String)>,

    /// Per-request timeout.
    timeout: Duration,
}

impl A2AClient {
    /// Create a client with a freshly built connection pool.
    pub fn new(base_url: &str, pool: &PoolConfig) -> A2AResult<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout)
            .build()?;
        Self::with_http_client(base_url, http, pool.max_connections)
    }

    /// Create a client around an existing HTTP client.
    pub fn with_http_client(
        base_url: &str,
        http: Client,
        max_connections: usize,
    ) -> A2AResult<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            permits: Arc::new(Semaphore::new(max_connections.max(1))),
            auth: None,
            timeout: Duration::from_secs(30),
        })
    }

    /// Attach an authentication header to every request.
    pub fn with_auth_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = Some((name.into(), value.into()));
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the message-send endpoint.
    pub fn message_send_url(&self) -> String {
        format!("{}{}", self.base_url, MESSAGE_SEND_PATH)
    }

    /// URL of the agent card.
    pub fn agent_card_url(&self) -> String {
        format!("{}{}", self.base_url, WELL_KNOWN_AGENT_CARD_PATH)
    }

    /// Request headers with credentials replaced by [`REDACTED`].
    pub fn redacted_headers(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut headers = serde_json::Map::new();
        headers.insert("Content-Type".into(), "application/json".into());
        if let Some((name, _)) = &self.auth {
            headers.insert(name.clone(), REDACTED.into());
        }
        headers
    }

    // ── Operations ───────────────────────────────────────────

    /// Send a message and return the raw reply body.
    pub async fn send_message(&self, request: &SendMessageRequest) -> A2AResult<RawReply> {
        let url = self.message_send_url();
        tracing::debug!(url = %url, "Sending A2A message");

        let _permit = self.permits.acquire().await.map_err(|_| {
            A2AError::MalformedReply("connection pool closed".into())
        })?;

        let response = self
            .authed(self.http.post(&url))
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(A2AError::Http {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| self.classify(e))?;
        Ok(RawReply {
            http_status: status.as_u16(),
            body,
        })
    }

    /// Fetch the agent card from the well-known endpoint.
    pub async fn fetch_agent_card(&self) -> A2AResult<AgentCard> {
        let url = self.agent_card_url();
        tracing::debug!(url = %url, "Fetching A2A agent card");

        let _permit = self.permits.acquire().await.map_err(|_| {
            A2AError::DiscoveryFailed("connection pool closed".into())
        })?;

        let response = self
            .authed(self.http.get(&url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(A2AError::Http {
                status: status.as_u16(),
                url,
                body: response.text().await.ok(),
            });
        }

        let card: AgentCard = response
            .json()
            .await
            .map_err(|e| A2AError::InvalidAgentCard(format!("Failed to parse agent card: {e}")))?;

        tracing::info!(
            name = %card.name,
            skills = card.skills.len(),
            "Discovered A2A agent"
        );
        Ok(card)
    }

    // ── Internal ─────────────────────────────────────────────

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("Content-Type", "application/json");
        match &self.auth {
            Some((name, value)) => builder.header(name.as_str(), value.as_str()),
            None => builder,
        }
    }

    fn classify(&self, e: reqwest::Error) -> A2AError {
        if e.is_timeout() {
            A2AError::Timeout(self.timeout)
        } else {
            A2AError::Transport(e)
        }
    }
}

// ── Request / Reply Types ────────────────────────────────────

/// Body of a `message/send` request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    /// The message to send.
    pub message: Message,

    /// Context ID grouping related tasks.
    pub context_id: String,

    /// Optional metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl SendMessageRequest {
    /// Request invoking a named skill in a fresh context.
    pub fn tool_invocation(tool_name: &str, params: &serde_json::Value) -> Self {
        Self {
            message: Message::tool_invocation(tool_name, params),
            context_id: uuid::Uuid::new_v4().to_string(),
            metadata: None,
        }
    }
}

/// A reply as received: HTTP status plus the JSON body.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub http_status: u16,
    pub body: serde_json::Value,
}

impl RawReply {
    /// Parse the body as a task envelope.
    pub fn task(&self) -> A2AResult<TaskReply> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| A2AError::MalformedReply(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_send_message_request_serialization() {
        let req = SendMessageRequest::tool_invocation("get_products", &json!({"brief": "Coffee"}));
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["context_id"].is_string());
        assert_eq!(json["message"]["role"], "user");
        assert_eq!(json["message"]["parts"][1]["data"]["skill"], "get_products");
    }

    #[test]
    fn test_urls_and_redaction() {
        let client = A2AClient::new("https://agent.example.com/", &PoolConfig::default())
            .unwrap()
            .with_auth_header("x-adcp-auth", "secret-token");
        assert_eq!(client.message_send_url(), "https://agent.example.com/message/send");
        assert_eq!(
            client.agent_card_url(),
            "https://agent.example.com/.well-known/agent.json"
        );
        let headers = client.redacted_headers();
        assert_eq!(headers["x-adcp-auth"], REDACTED);
        assert!(!serde_json::to_string(&headers).unwrap().contains("secret-token"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            A2AClient::new("not a url", &PoolConfig::default()),
            Err(A2AError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_send_message_with_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/send"))
            .and(header("x-adcp-auth", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "completed",
                "artifacts": [{"parts": [{"kind": "data", "data": {"ok": true}}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = A2AClient::new(&server.uri(), &PoolConfig::default())
            .unwrap()
            .with_auth_header("x-adcp-auth", "tok");
        let reply = client
            .send_message(&SendMessageRequest::tool_invocation("ping", &json!({})))
            .await
            .unwrap();
        assert_eq!(reply.http_status, 200);
        assert_eq!(reply.task().unwrap().authoritative_data().unwrap(), &json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/agent.json"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = A2AClient::new(&server.uri(), &PoolConfig::default()).unwrap();
        let err = client.fetch_agent_card().await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
