//! MCP adapter: tool calls over a lazily opened, shared MCP session.

use std::sync::Arc;
use std::time::Instant;

use adcp_mcp::{CallToolResult, Implementation, McpError, McpSession, TransportOptions};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::{AgentInfo, ProtocolAdapter};
use crate::config::{AgentConfig, Protocol};
use crate::error::{AdcpError, AdcpResult};
use crate::result::{DebugInfo, Failed, TaskResult};

/// Path suffix tried when the configured URI does not already end in it.
pub const MCP_PATH_SUFFIX: &str = "/mcp";

/// Adapter for agents speaking MCP.
///
/// The session is opened by the first call that needs it. Concurrent first
/// calls wait on the same connection attempt. A call that fails at the
/// transport level drops the session so the next call reconnects.
pub struct McpAdapter {
    config: Arc<AgentConfig>,
    http: Client,
    session: Mutex<Option<Arc<McpSession>>>,
}

impl McpAdapter {
    pub fn new(config: Arc<AgentConfig>) -> Self {
        Self::with_http_client(config, Client::new())
    }

    pub fn with_http_client(config: Arc<AgentConfig>, http: Client) -> Self {
        Self {
            config,
            http,
            session: Mutex::new(None),
        }
    }

    /// The configured URI, then the URI with `/mcp` appended if it lacks it.
    pub fn candidate_urls(agent_uri: &str) -> Vec<String> {
        let mut urls = vec![agent_uri.to_string()];
        let trimmed = agent_uri.trim_end_matches('/');
        if !trimmed.ends_with(MCP_PATH_SUFFIX) {
            urls.push(format!("{trimmed}{MCP_PATH_SUFFIX}"));
        }
        urls
    }

    fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            headers: self.config.auth_header_pair().into_iter().collect(),
            timeout: self.config.timeout,
        }
    }

    fn client_info() -> Implementation {
        Implementation {
            name: "adcp-rust".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }

    /// Return the live session, connecting if there is none.
    async fn session(&self) -> AdcpResult<Arc<McpSession>> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }
        let session = Arc::new(self.connect().await?);
        *slot = Some(session.clone());
        Ok(session)
    }

    async fn connect(&self) -> AdcpResult<McpSession> {
        let urls = Self::candidate_urls(&self.config.agent_uri);
        let mut last_error: Option<McpError> = None;

        for (attempt, url) in urls.iter().enumerate() {
            if attempt > 0 {
                tracing::info!(
                    agent_id = %self.config.id,
                    url = %url,
                    "Retrying MCP connection with fallback URL"
                );
            }
            tracing::info!(
                agent_id = %self.config.id,
                url = %url,
                transport = %self.config.mcp_transport,
                "Connecting to MCP agent"
            );
            match McpSession::connect(
                self.config.mcp_transport,
                self.http.clone(),
                url,
                self.transport_options(),
                Self::client_info(),
            )
            .await
            {
                Ok(session) => {
                    tracing::info!(
                        agent_id = %self.config.id,
                        url = %url,
                        server = %session.server_info().server_info.name,
                        "Connected to MCP agent"
                    );
                    return Ok(session);
                }
                Err(e) => {
                    tracing::debug!(agent_id = %self.config.id, url = %url, error = %e, "MCP connection attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let Some(error) = last_error else {
            return Err(AdcpError::connection(&self.config, "no MCP URL to try"));
        };
        tracing::error!(
            agent_id = %self.config.id,
            transport = %self.config.mcp_transport,
            urls = %urls.join(", "),
            error = %error,
            "Failed to connect to MCP agent"
        );
        let message = format!(
            "{error} (transport {}, tried {})",
            self.config.mcp_transport,
            urls.join(", ")
        );
        Err(match AdcpError::from_mcp(&self.config, &error, None) {
            AdcpError::Authentication { .. } => AdcpError::authentication(&self.config, message),
            AdcpError::Timeout { .. } => AdcpError::timeout(&self.config, message),
            AdcpError::Protocol { .. } => AdcpError::protocol(&self.config, message),
            _ => AdcpError::connection(&self.config, message),
        })
    }

    /// Drop `session` if it is still the current one.
    async fn invalidate(&self, session: &Arc<McpSession>) {
        let stale = {
            let mut slot = self.session.lock().await;
            match slot.as_ref() {
                Some(current) if Arc::ptr_eq(current, session) => slot.take(),
                _ => None,
            }
        };
        if let Some(stale) = stale {
            if let Err(e) = stale.close().await {
                tracing::debug!(agent_id = %self.config.id, error = %e, "Ignoring error closing stale MCP session");
            }
        }
    }

    fn debug_info(
        &self,
        session: &McpSession,
        tool: &str,
        params: &Value,
        response: Value,
        started: Instant,
    ) -> Option<DebugInfo> {
        if !self.config.debug {
            return None;
        }
        let mut headers = serde_json::Map::new();
        if let Some((name, _)) = self.config.auth_header_pair() {
            headers.insert(name, adcp_a2a::REDACTED.into());
        }
        Some(DebugInfo {
            request: json!({
                "url": session.endpoint(),
                "method": "tools/call",
                "headers": headers,
                "body": {"name": tool, "arguments": params},
            }),
            response,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Map a `tools/call` result onto a task result.
fn map_call_result(result: CallToolResult) -> TaskResult<Value> {
    if result.is_error {
        let text = result.text();
        return TaskResult::Failed(Failed {
            error: if text.is_empty() {
                "Tool returned an error".into()
            } else {
                text
            },
            debug_info: None,
        });
    }
    match (result.content.is_empty(), result.structured_content) {
        (true, Some(structured)) => TaskResult::completed(structured),
        _ => TaskResult::completed(serde_json::to_value(&result.content).unwrap_or(Value::Null)),
    }
}

#[async_trait]
impl ProtocolAdapter for McpAdapter {
    async fn call_tool(&self, tool: &str, params: Value) -> AdcpResult<TaskResult<Value>> {
        let session = self.session().await?;
        let started = Instant::now();

        tracing::debug!(agent_id = %self.config.id, tool = %tool, "Calling MCP tool");
        match session.call_tool(tool, params.clone()).await {
            Ok(result) => {
                let response = serde_json::to_value(&result).unwrap_or(Value::Null);
                let mut mapped = map_call_result(result);
                mapped.set_debug_info(self.debug_info(&session, tool, &params, response, started));
                Ok(mapped)
            }
            Err(e) if e.is_not_found() => Err(AdcpError::tool_not_found(&self.config, tool)),
            Err(e) => {
                let error = AdcpError::from_mcp(&self.config, &e, Some(tool));
                tracing::warn!(agent_id = %self.config.id, tool = %tool, error = %error, "MCP call failed");
                if !matches!(e, McpError::Rpc(_)) {
                    self.invalidate(&session).await;
                }
                let mut failed = TaskResult::failed(error.to_string());
                failed.set_debug_info(self.debug_info(
                    &session,
                    tool,
                    &params,
                    json!({"error": e.to_string()}),
                    started,
                ));
                Ok(failed)
            }
        }
    }

    async fn list_tools(&self) -> AdcpResult<Vec<String>> {
        let session = self.session().await?;
        let tools = session
            .list_tools()
            .await
            .map_err(|e| AdcpError::from_mcp(&self.config, &e, None))?;
        tracing::info!(agent_id = %self.config.id, tools = tools.len(), "Listed MCP tools");
        Ok(tools.into_iter().map(|t| t.name).collect())
    }

    async fn agent_info(&self) -> AdcpResult<AgentInfo> {
        let session = self.session().await?;
        let tools = self.list_tools().await?;
        let server = session.server_info();
        let adcp = server
            .capabilities
            .get("experimental")
            .and_then(|e| e.get("adcp"));
        let protocols_supported = adcp
            .and_then(|a| a.get("protocols_supported"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Ok(AgentInfo {
            name: server.server_info.name.clone(),
            description: server.instructions.clone(),
            version: Some(server.server_info.version.clone()).filter(|v| !v.is_empty()),
            protocol: Protocol::Mcp,
            agent_uri: self.config.agent_uri.clone(),
            tools,
            adcp_version: adcp
                .and_then(|a| a.get("adcp_version"))
                .and_then(Value::as_str)
                .map(String::from),
            protocols_supported,
        })
    }

    async fn close(&self) -> AdcpResult<()> {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            tracing::debug!(agent_id = %self.config.id, "Closing MCP session");
            if let Err(e) = session.close().await {
                tracing::debug!(agent_id = %self.config.id, error = %e, "Error during MCP session cleanup");
            }
        }
        Ok(())
    }
}
