//! # adcp-core
//!
//! Typed client for the Ad Context Protocol (AdCP).
//!
//! This crate provides:
//! - A per-agent client over A2A or MCP with one typed method per operation
//! - A uniform [`TaskResult`] for completed, submitted, input-needed and failed tasks
//! - Concurrent fan-out across many agents
//! - A keyword-style accessor for scripts
//! - Webhook URL templating, signature checks and status handlers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adcp_core::{AdcpClient, AgentConfig, GetProductsRequest, Protocol, TaskResult};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::builder("sales", "https://sales.example.com", Protocol::Mcp)
//!         .bearer_token("secret")
//!         .build()?;
//!     let client = AdcpClient::new(config)?;
//!
//!     let result = client
//!         .get_products(&GetProductsRequest::with_brief("Coffee subscription, US only"))
//!         .await;
//!     match result {
//!         TaskResult::Completed(c) => println!("{} products", c.data.products.len()),
//!         TaskResult::Submitted(s) => println!("pending, webhook {:?}", s.webhook_url),
//!         other => println!("{:?}: {:?}", other.status(), other.error()),
//!     }
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod client;
pub mod config;
pub mod error;
pub mod multi;
pub mod normalize;
pub mod protocols;
pub mod result;
pub mod simple;
pub mod telemetry;
pub mod types;
pub mod webhook;

// Re-exports
pub use activity::{
    Activity, ActivityCallback, ActivityType, NotificationType, StatusHandler, StatusHandlers,
    WebhookMetadata,
};
pub use client::{AdcpClient, ClientOptions};
pub use config::{AdcpConfig, AgentConfig, AgentConfigBuilder, AuthType, McpTransportKind, Protocol, TelemetryConfig};
pub use error::{AdcpError, AdcpResult};
pub use multi::MultiAgentClient;
pub use protocols::{AgentInfo, ProtocolAdapter};
pub use result::{Completed, DebugInfo, Failed, NeedsInput, Submitted, TaskResult, TaskStatus};
pub use simple::{SimpleApi, SimpleApiError, SimpleResult};
pub use types::*;
pub use webhook::{sign_payload, verify_signature, WebhookPayload};
