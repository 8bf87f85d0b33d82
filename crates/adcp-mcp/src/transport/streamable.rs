//! Streamable HTTP transport.

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tokio::sync::RwLock;
use url::Url;

use super::{McpTransport, TransportOptions, SESSION_ID_HEADER};
use crate::error::{McpError, McpResult};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse, RequestId};

const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Streamable HTTP transport: one POST per message.
pub struct StreamableHttpTransport {
    http: Client,
    url: String,
    options: TransportOptions,
    session_id: RwLock<Option<String>>,
}

impl StreamableHttpTransport {
    /// Create the transport. No network traffic happens until the first
    /// request.
    pub fn new(http: Client, url: &str, options: TransportOptions) -> McpResult<Self> {
        Url::parse(url)?;
        Ok(Self {
            http,
            url: url.to_string(),
            options,
            session_id: RwLock::new(None),
        })
    }

    /// Session id assigned by the server, if any.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    async fn post(&self, message: &JsonRpcRequest) -> McpResult<reqwest::Response> {
        let mut builder = self
            .options
            .apply(self.http.post(&self.url))
            .header(ACCEPT, ACCEPT_BOTH)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.options.timeout)
            .json(message);
        if let Some(session_id) = self.session_id.read().await.as_deref() {
            builder = builder.header(SESSION_ID_HEADER, session_id);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(McpError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
                body: response.text().await.ok(),
            });
        }

        if let Some(session_id) = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.write().await = Some(session_id.to_string());
        }
        Ok(response)
    }

    async fn read_response(
        &self,
        response: reqwest::Response,
        id: Option<&RequestId>,
    ) -> McpResult<JsonRpcResponse> {
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        if !is_event_stream {
            let value: serde_json::Value = response.json().await.map_err(|e| self.classify(e))?;
            return JsonRpcResponse::from_message(&value).ok_or_else(|| {
                McpError::MalformedResponse(format!("not a JSON-RPC response: {value}"))
            });
        }

        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| match e {
                EventStreamError::Transport(inner) => self.classify(inner),
                other => McpError::Stream(other.to_string()),
            })?;
            if event.data.trim().is_empty() {
                continue;
            }
            let value: serde_json::Value = match serde_json::from_str(&event.data) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, "Skipping unparseable event");
                    continue;
                }
            };
            if let Some(reply) = JsonRpcResponse::from_message(&value) {
                if id.is_none() || reply.id.as_ref() == id {
                    return Ok(reply);
                }
            }
        }
        Err(McpError::MalformedResponse(
            "event stream ended without a response".into(),
        ))
    }

    fn classify(&self, e: reqwest::Error) -> McpError {
        if e.is_timeout() {
            McpError::Timeout(self.options.timeout)
        } else {
            McpError::Transport(e)
        }
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn request(&self, request: JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        tracing::debug!(url = %self.url, method = %request.method, "MCP request");
        let response = self.post(&request).await?;
        self.read_response(response, request.id.as_ref()).await
    }

    async fn notify(&self, notification: JsonRpcRequest) -> McpResult<()> {
        tracing::debug!(url = %self.url, method = %notification.method, "MCP notification");
        self.post(&notification).await.map(drop)
    }

    async fn close(&self) -> McpResult<()> {
        let Some(session_id) = self.session_id.write().await.take() else {
            return Ok(());
        };
        let response = self
            .options
            .apply(self.http.delete(&self.url))
            .header(SESSION_ID_HEADER, session_id.as_str())
            .timeout(self.options.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        // Servers that do not support explicit termination answer 405.
        if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
            Ok(())
        } else {
            Err(McpError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
                body: None,
            })
        }
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
