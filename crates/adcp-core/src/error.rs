//! Error taxonomy for the AdCP client.
//!
//! These errors are raised for conditions the caller cannot treat as a normal
//! outcome: the agent could not be reached, rejected our credentials, or
//! answered with something that is not the protocol. A task that the agent
//! itself reports as failed is not an error; it comes back as
//! [`TaskResult::Failed`](crate::TaskResult::Failed).

use std::time::Duration;

use adcp_a2a::A2AError;
use adcp_mcp::McpError;
use thiserror::Error;

use crate::config::AgentConfig;

#[derive(Debug, Error)]
pub enum AdcpError {
    #[error("Failed to connect to agent {agent_id} at {agent_uri}: {message}")]
    Connection {
        agent_id: String,
        agent_uri: String,
        message: String,
    },

    #[error("Authentication failed for agent {agent_id} at {agent_uri}: {message}")]
    Authentication {
        agent_id: String,
        agent_uri: String,
        message: String,
    },

    #[error("Agent {agent_id} at {agent_uri} timed out after {}s: {message}", .timeout.as_secs_f64())]
    Timeout {
        agent_id: String,
        agent_uri: String,
        timeout: Duration,
        message: String,
    },

    #[error("Protocol error from agent {agent_id} at {agent_uri}: {message}")]
    Protocol {
        agent_id: String,
        agent_uri: String,
        message: String,
    },

    #[error("Tool '{tool}' not found on agent {agent_id} at {agent_uri}")]
    ToolNotFound {
        agent_id: String,
        agent_uri: String,
        tool: String,
    },

    #[error("Webhook error for agent {agent_id}: {message}")]
    Webhook { agent_id: String, message: String },

    #[error("Webhook signature verification failed for agent {agent_id}: {message}")]
    WebhookSignature { agent_id: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid parameters for {operation}: {message}")]
    InvalidParams { operation: String, message: String },
}

impl AdcpError {
    pub fn connection(config: &AgentConfig, message: impl Into<String>) -> Self {
        AdcpError::Connection {
            agent_id: config.id.clone(),
            agent_uri: config.agent_uri.clone(),
            message: message.into(),
        }
    }

    pub fn authentication(config: &AgentConfig, message: impl Into<String>) -> Self {
        AdcpError::Authentication {
            agent_id: config.id.clone(),
            agent_uri: config.agent_uri.clone(),
            message: message.into(),
        }
    }

    pub fn timeout(config: &AgentConfig, message: impl Into<String>) -> Self {
        AdcpError::Timeout {
            agent_id: config.id.clone(),
            agent_uri: config.agent_uri.clone(),
            timeout: config.timeout,
            message: message.into(),
        }
    }

    pub fn protocol(config: &AgentConfig, message: impl Into<String>) -> Self {
        AdcpError::Protocol {
            agent_id: config.id.clone(),
            agent_uri: config.agent_uri.clone(),
            message: message.into(),
        }
    }

    pub fn tool_not_found(config: &AgentConfig, tool: impl Into<String>) -> Self {
        AdcpError::ToolNotFound {
            agent_id: config.id.clone(),
            agent_uri: config.agent_uri.clone(),
            tool: tool.into(),
        }
    }

    /// Classify a failure from its message alone. Used when the underlying
    /// error carries no structured status.
    pub fn classify_message(config: &AgentConfig, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("401") || lower.contains("403") || lower.contains("unauthorized") {
            Self::authentication(config, message)
        } else if lower.contains("timeout") || lower.contains("timed out") {
            Self::timeout(config, message)
        } else {
            Self::connection(config, message)
        }
    }

    /// Classify an A2A transport failure.
    pub fn from_a2a(config: &AgentConfig, error: &A2AError) -> Self {
        let message = error.to_string();
        if error.is_unauthorized() {
            return Self::authentication(config, message);
        }
        if error.is_timeout() {
            return Self::timeout(config, message);
        }
        match error {
            A2AError::MalformedReply(_)
            | A2AError::InvalidAgentCard(_)
            | A2AError::Serialization(_) => Self::protocol(config, message),
            // Status already inspected; the URL in the message must not be.
            A2AError::Http { .. } | A2AError::Transport(_) => Self::connection(config, message),
            _ => Self::classify_message(config, message),
        }
    }

    /// Classify an MCP failure. `tool` names the tool being called, if any.
    pub fn from_mcp(config: &AgentConfig, error: &McpError, tool: Option<&str>) -> Self {
        let message = error.to_string();
        if error.is_unauthorized() {
            return Self::authentication(config, message);
        }
        if error.is_timeout() {
            return Self::timeout(config, message);
        }
        if let (true, Some(tool)) = (error.is_not_found(), tool) {
            return Self::tool_not_found(config, tool);
        }
        match error {
            McpError::Rpc(_) | McpError::MalformedResponse(_) | McpError::Serialization(_) => {
                Self::protocol(config, message)
            }
            McpError::Http { .. } | McpError::Transport(_) => Self::connection(config, message),
            _ => Self::classify_message(config, message),
        }
    }

    /// The agent this error concerns, if it is agent-scoped.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            AdcpError::Connection { agent_id, .. }
            | AdcpError::Authentication { agent_id, .. }
            | AdcpError::Timeout { agent_id, .. }
            | AdcpError::Protocol { agent_id, .. }
            | AdcpError::ToolNotFound { agent_id, .. }
            | AdcpError::Webhook { agent_id, .. }
            | AdcpError::WebhookSignature { agent_id, .. } => Some(agent_id),
            AdcpError::Config(_) | AdcpError::InvalidParams { .. } => None,
        }
    }

    /// Whether this error came from a webhook delivery.
    pub fn is_webhook(&self) -> bool {
        matches!(self, AdcpError::Webhook { .. } | AdcpError::WebhookSignature { .. })
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdcpError::Connection { .. } | AdcpError::Timeout { .. })
    }
}

/// Result type alias for AdCP operations.
pub type AdcpResult<T> = Result<T, AdcpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, Protocol};

    fn config() -> AgentConfig {
        AgentConfig::builder("sales", "https://sales.example.com", Protocol::Mcp)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_classify_message() {
        let cfg = config();
        assert!(matches!(
            AdcpError::classify_message(&cfg, "HTTP 401 Unauthorized"),
            AdcpError::Authentication { .. }
        ));
        assert!(matches!(
            AdcpError::classify_message(&cfg, "request timed out"),
            AdcpError::Timeout { .. }
        ));
        assert!(matches!(
            AdcpError::classify_message(&cfg, "connection refused"),
            AdcpError::Connection { .. }
        ));
    }

    #[test]
    fn test_messages_carry_agent_context() {
        let cfg = config();
        let err = AdcpError::timeout(&cfg, "deadline exceeded");
        let text = err.to_string();
        assert!(text.contains("sales"));
        assert!(text.contains("https://sales.example.com"));
        assert!(text.contains("5s"));
        assert_eq!(err.agent_id(), Some("sales"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_mcp_structural() {
        let cfg = config();
        let err = McpError::Http {
            status: 403,
            url: "https://sales.example.com/mcp".into(),
            body: None,
        };
        assert!(matches!(
            AdcpError::from_mcp(&cfg, &err, None),
            AdcpError::Authentication { .. }
        ));

        let err = McpError::Rpc(adcp_mcp::JsonRpcError {
            code: -32601,
            message: "Method not found".into(),
            data: None,
        });
        match AdcpError::from_mcp(&cfg, &err, Some("get_widgets")) {
            AdcpError::ToolNotFound { tool, .. } => assert_eq!(tool, "get_widgets"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            AdcpError::from_mcp(&cfg, &err, None),
            AdcpError::Protocol { .. }
        ));
    }

    #[test]
    fn test_from_a2a_structural() {
        let cfg = config();
        let err = A2AError::Http {
            status: 401,
            url: "https://sales.example.com/message/send".into(),
            body: None,
        };
        assert!(matches!(
            AdcpError::from_a2a(&cfg, &err),
            AdcpError::Authentication { .. }
        ));
        let err = A2AError::MalformedReply("missing status".into());
        assert!(matches!(
            AdcpError::from_a2a(&cfg, &err),
            AdcpError::Protocol { .. }
        ));
        assert!(!AdcpError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn test_http_status_ignores_url_digits() {
        let cfg = config();
        let err = McpError::Http {
            status: 404,
            url: "http://127.0.0.1:54013/mcp".into(),
            body: None,
        };
        assert!(matches!(
            AdcpError::from_mcp(&cfg, &err, None),
            AdcpError::Connection { .. }
        ));
    }
}
