//! Protocol adapters.
//!
//! An adapter turns a logical operation (tool name plus parameters) into one
//! exchange over the agent's wire protocol and maps the reply into a raw
//! [`TaskResult`]. Adapters connect lazily, are safe to share between
//! concurrent calls, and reconnect on the next call after [`close`].
//!
//! Errors split in two. Failing to reach or authenticate with the agent, or
//! naming a tool it does not have, is an [`AdcpError`]. A call that reached
//! the agent but failed comes back as [`TaskResult::Failed`].
//!
//! [`close`]: ProtocolAdapter::close
//! [`AdcpError`]: crate::AdcpError

pub mod a2a;
pub mod mcp;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{AgentConfig, Protocol};
use crate::error::AdcpResult;
use crate::result::TaskResult;

pub use a2a::A2aAdapter;
pub use mcp::McpAdapter;

/// Transport for one agent.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Invoke `tool` with `params`.
    async fn call_tool(&self, tool: &str, params: Value) -> AdcpResult<TaskResult<Value>>;

    /// Names of the operations the agent exposes.
    async fn list_tools(&self) -> AdcpResult<Vec<String>>;

    /// Describe the agent.
    async fn agent_info(&self) -> AdcpResult<AgentInfo>;

    /// Release the connection. Safe to call repeatedly and before any call.
    async fn close(&self) -> AdcpResult<()>;
}

/// What an agent says about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub protocol: Protocol,
    pub agent_uri: String,
    pub tools: Vec<String>,
    /// AdCP version the agent implements, when it declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adcp_version: Option<String>,
    /// AdCP protocols implemented, e.g. `media_buy` or `signals`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols_supported: Vec<String>,
}

/// Build the adapter matching `config.protocol`.
pub fn adapter_for(config: Arc<AgentConfig>) -> Arc<dyn ProtocolAdapter> {
    match config.protocol {
        Protocol::A2a => Arc::new(A2aAdapter::new(config)),
        Protocol::Mcp => Arc::new(McpAdapter::new(config)),
    }
}
