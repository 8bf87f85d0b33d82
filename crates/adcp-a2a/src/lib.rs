//! # adcp-a2a
//!
//! Wire model and HTTP client for the A2A message-passing protocol as used by
//! Ad Context Protocol (AdCP) agents.
//!
//! An AdCP operation is carried as a user message posted to
//! `{agent}/message/send`. The agent answers with a task envelope whose
//! `status` is one of the A2A lifecycle states and whose `artifacts` carry
//! kind-tagged parts. The authoritative payload is the last data part of the
//! last artifact.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adcp_a2a::{A2AClient, PoolConfig, SendMessageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = A2AClient::new("https://agent.example.com", &PoolConfig::default())?;
//!     let request = SendMessageRequest::tool_invocation(
//!         "get_products",
//!         &serde_json::json!({"brief": "Coffee subscription"}),
//!     );
//!     let reply = client.send_message(&request).await?.task()?;
//!     println!("Task state: {}", reply.state());
//!     Ok(())
//! }
//! ```

pub mod agent_card;
pub mod artifact;
pub mod client;
pub mod error;
pub mod message;
pub mod task;

// Re-export primary types
pub use agent_card::{AdcpExtension, AgentCapabilities, AgentCard, AgentExtension, AgentSkill};
pub use artifact::Artifact;
pub use client::{A2AClient, PoolConfig, RawReply, SendMessageRequest, REDACTED};
pub use error::{A2AError, A2AResult};
pub use message::{FilePart, Message, MessageRole, Part};
pub use task::{MissingData, TaskReply, TaskState, TaskStatus};
