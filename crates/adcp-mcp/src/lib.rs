//! # adcp-mcp
//!
//! Model Context Protocol client session used by AdCP agents that expose
//! their operations as MCP tools.
//!
//! - [`jsonrpc`]: JSON-RPC 2.0 framing and MCP method names
//! - [`content`]: tool results, content parts, tool listings
//! - [`transport`]: streamable HTTP and legacy SSE transports
//! - [`session`]: the initialize handshake, `tools/call`, paginated `tools/list`
//!
//! ```rust,no_run
//! use adcp_mcp::{Implementation, McpSession, TransportKind, TransportOptions};
//!
//! # async fn run() -> adcp_mcp::McpResult<()> {
//! let session = McpSession::connect(
//!     TransportKind::StreamableHttp,
//!     reqwest::Client::new(),
//!     "https://agent.example.com/mcp",
//!     TransportOptions::default(),
//!     Implementation { name: "my-app".into(), version: "1.0.0".into() },
//! )
//! .await?;
//! let result = session
//!     .call_tool("get_products", serde_json::json!({"brief": "Coffee"}))
//!     .await?;
//! println!("{}", result.text());
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod error;
pub mod jsonrpc;
pub mod session;
pub mod transport;

pub use content::{CallToolResult, Content, Implementation, InitializeResult, Tool};
pub use error::{McpError, McpResult};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use session::McpSession;
pub use transport::{McpTransport, TransportKind, TransportOptions};
