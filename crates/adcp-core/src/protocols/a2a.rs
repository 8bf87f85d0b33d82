//! A2A adapter: one `message/send` exchange per operation.

use std::sync::Arc;
use std::time::Instant;

use adcp_a2a::{A2AClient, MissingData, PoolConfig, RawReply, SendMessageRequest, TaskReply, TaskState};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use super::{AgentInfo, ProtocolAdapter};
use crate::config::{AgentConfig, Protocol};
use crate::error::{AdcpError, AdcpResult};
use crate::normalize::has_errors;
use crate::result::{Completed, DebugInfo, Failed, Submitted, TaskResult};

/// Adapter for agents speaking A2A.
///
/// The pooled client is built on first use and shared by every call until
/// [`close`](ProtocolAdapter::close) drops it.
pub struct A2aAdapter {
    config: Arc<AgentConfig>,
    pool: PoolConfig,
    client: Mutex<Option<A2AClient>>,
}

impl A2aAdapter {
    pub fn new(config: Arc<AgentConfig>) -> Self {
        Self::with_pool(config, PoolConfig::default())
    }

    pub fn with_pool(config: Arc<AgentConfig>, pool: PoolConfig) -> Self {
        Self {
            config,
            pool,
            client: Mutex::new(None),
        }
    }

    async fn client(&self) -> AdcpResult<A2AClient> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let mut client = A2AClient::new(&self.config.agent_uri, &self.pool)
            .map_err(|e| AdcpError::from_a2a(&self.config, &e))?
            .with_timeout(self.config.timeout);
        if let Some((name, value)) = self.config.auth_header_pair() {
            client = client.with_auth_header(name, value);
        }
        tracing::debug!(
            agent_id = %self.config.id,
            url = %client.base_url(),
            max_connections = self.pool.max_connections,
            "Created A2A client"
        );
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Map a parsed reply onto a task result according to its state.
    fn map_reply(&self, tool: &str, reply: &TaskReply, raw: &Value) -> TaskResult<Value> {
        let message = reply.message();
        let mut metadata = Map::new();
        metadata.insert("task_id".into(), json!(reply.task_id));
        metadata.insert("context_id".into(), json!(reply.context_id));

        match reply.state() {
            TaskState::Completed => {
                let data = self.extract_data(tool, reply, raw);
                let success = !has_errors(&data);
                TaskResult::Completed(Completed {
                    data,
                    success,
                    message,
                    metadata: Some(metadata),
                    debug_info: None,
                })
            }
            TaskState::Failed => TaskResult::Failed(Failed {
                error: message.unwrap_or_else(|| "Task failed".into()),
                debug_info: None,
            }),
            // Working, submitted, input-required and anything unknown.
            _ => TaskResult::Submitted(Submitted {
                task_id: reply.task_id.clone(),
                partial_data: Some(self.extract_data(tool, reply, raw)),
                message,
                metadata: Some(metadata),
                ..Submitted::default()
            }),
        }
    }

    /// The authoritative data part, or the whole reply when there is none.
    /// A data part without data reads as an empty object.
    fn extract_data(&self, tool: &str, reply: &TaskReply, raw: &Value) -> Value {
        match reply.authoritative_data() {
            Ok(Value::Null) => {
                tracing::warn!(
                    agent_id = %self.config.id,
                    tool = %tool,
                    "A2A data part carries no data; using an empty object"
                );
                json!({})
            }
            Ok(data) => data.clone(),
            Err(missing) => {
                let reason = match missing {
                    MissingData::NoArtifacts => "missing required artifacts array",
                    MissingData::NoParts => "artifact has no parts",
                    MissingData::NoDataPart => "missing required data part",
                };
                tracing::warn!(
                    agent_id = %self.config.id,
                    tool = %tool,
                    "A2A response {reason}; using the raw reply as data"
                );
                raw.clone()
            }
        }
    }

    fn debug_info(
        &self,
        client: &A2AClient,
        request: &SendMessageRequest,
        response: Value,
        started: Instant,
    ) -> Option<DebugInfo> {
        if !self.config.debug {
            return None;
        }
        Some(DebugInfo {
            request: json!({
                "url": client.message_send_url(),
                "method": "POST",
                "headers": client.redacted_headers(),
                "body": request,
            }),
            response,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[async_trait]
impl ProtocolAdapter for A2aAdapter {
    async fn call_tool(&self, tool: &str, params: Value) -> AdcpResult<TaskResult<Value>> {
        let client = self.client().await?;
        let request = SendMessageRequest::tool_invocation(tool, &params);
        let started = Instant::now();

        tracing::debug!(agent_id = %self.config.id, tool = %tool, "Calling A2A tool");
        let (mut result, debug) = match client.send_message(&request).await {
            Ok(RawReply { http_status, body }) => {
                let result = match serde_json::from_value::<TaskReply>(body.clone()) {
                    Ok(reply) => self.map_reply(tool, &reply, &body),
                    Err(e) => {
                        let error = AdcpError::protocol(&self.config, format!("malformed task reply: {e}"));
                        TaskResult::failed(error.to_string())
                    }
                };
                let debug = self.debug_info(
                    &client,
                    &request,
                    json!({"status": http_status, "body": body}),
                    started,
                );
                (result, debug)
            }
            Err(e) => {
                let error = AdcpError::from_a2a(&self.config, &e);
                tracing::warn!(agent_id = %self.config.id, tool = %tool, error = %error, "A2A call failed");
                let debug = self.debug_info(&client, &request, json!({"error": e.to_string()}), started);
                (TaskResult::failed(error.to_string()), debug)
            }
        };
        result.set_debug_info(debug);
        Ok(result)
    }

    async fn list_tools(&self) -> AdcpResult<Vec<String>> {
        let client = self.client().await?;
        let card = client.fetch_agent_card().await.map_err(|e| {
            let error = AdcpError::from_a2a(&self.config, &e);
            tracing::error!(agent_id = %self.config.id, error = %error, "Failed to fetch agent card");
            error
        })?;
        let tools = card.skill_names();
        tracing::info!(agent_id = %self.config.id, tools = tools.len(), "Listed A2A tools");
        Ok(tools)
    }

    async fn agent_info(&self) -> AdcpResult<AgentInfo> {
        let client = self.client().await?;
        let card = client
            .fetch_agent_card()
            .await
            .map_err(|e| AdcpError::from_a2a(&self.config, &e))?;
        let extension = card.adcp_extension().unwrap_or_default();
        Ok(AgentInfo {
            name: card.name.clone(),
            description: card.description.clone(),
            version: card.version.clone(),
            protocol: Protocol::A2a,
            agent_uri: self.config.agent_uri.clone(),
            tools: card.skill_names(),
            adcp_version: extension.adcp_version,
            protocols_supported: extension.protocols_supported,
        })
    }

    async fn close(&self) -> AdcpResult<()> {
        if self.client.lock().await.take().is_some() {
            tracing::debug!(agent_id = %self.config.id, "Closed A2A client");
        }
        Ok(())
    }
}
