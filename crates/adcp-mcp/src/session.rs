//! MCP client session: handshake, tool calls, tool listing, teardown.

use std::sync::atomic::{AtomicI64, Ordering};

use reqwest::Client;
use serde_json::{json, Value};

use crate::content::{CallToolResult, Implementation, InitializeResult, ListToolsResult, Tool};
use crate::error::{McpError, McpResult};
use crate::jsonrpc::{methods, JsonRpcRequest, RequestId, MCP_PROTOCOL_VERSION};
use crate::transport::{self, McpTransport, TransportKind, TransportOptions};

/// An initialized MCP session over some transport.
pub struct McpSession {
    transport: Box<dyn McpTransport>,
    next_id: AtomicI64,
    server: InitializeResult,
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession")
            .field("endpoint", &self.transport.endpoint())
            .field("server", &self.server.server_info)
            .finish()
    }
}

impl McpSession {
    /// Open a transport of `kind` against `url` and run the handshake.
    pub async fn connect(
        kind: TransportKind,
        http: Client,
        url: &str,
        options: TransportOptions,
        client_info: Implementation,
    ) -> McpResult<Self> {
        let transport = transport::connect(kind, http, url, options).await?;
        Self::with_transport(transport, client_info).await
    }

    /// Run the handshake over an already-open transport. The transport is
    /// closed if the handshake fails.
    pub async fn with_transport(
        transport: Box<dyn McpTransport>,
        client_info: Implementation,
    ) -> McpResult<Self> {
        let next_id = AtomicI64::new(1);
        match handshake(transport.as_ref(), &next_id, client_info).await {
            Ok(server) => {
                tracing::debug!(
                    endpoint = %transport.endpoint(),
                    server = %server.server_info.name,
                    protocol_version = %server.protocol_version,
                    "MCP session initialized"
                );
                Ok(Self {
                    transport,
                    next_id,
                    server,
                })
            }
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    tracing::debug!(error = %close_err, "Ignoring teardown error after failed handshake");
                }
                Err(e)
            }
        }
    }

    /// What the server reported during the handshake.
    pub fn server_info(&self) -> &InitializeResult {
        &self.server
    }

    /// The URL this session talks to.
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Invoke a tool.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        let result = self
            .rpc(
                methods::CALL_TOOL,
                json!({ "name": name, "arguments": arguments }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// List every tool, following pagination cursors.
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = match &cursor {
                Some(c) => json!({ "cursor": c }),
                None => json!({}),
            };
            let page: ListToolsResult =
                serde_json::from_value(self.rpc(methods::LIST_TOOLS, params).await?)?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => break,
            }
        }
        Ok(tools)
    }

    /// Tear down the transport.
    pub async fn close(&self) -> McpResult<()> {
        self.transport.close().await
    }

    async fn rpc(&self, method: &str, params: Value) -> McpResult<Value> {
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        let request = JsonRpcRequest::new(id, method, Some(params));
        self.transport
            .request(request)
            .await?
            .into_result()
            .map_err(McpError::Rpc)
    }
}

async fn handshake(
    transport: &dyn McpTransport,
    next_id: &AtomicI64,
    client_info: Implementation,
) -> McpResult<InitializeResult> {
    let id = RequestId::Number(next_id.fetch_add(1, Ordering::Relaxed));
    let request = JsonRpcRequest::new(
        id,
        methods::INITIALIZE,
        Some(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": client_info,
        })),
    );
    let result = transport
        .request(request)
        .await?
        .into_result()
        .map_err(McpError::Rpc)?;
    let server: InitializeResult = serde_json::from_value(result)?;
    transport
        .notify(JsonRpcRequest::notification(methods::INITIALIZED, None))
        .await?;
    Ok(server)
}
