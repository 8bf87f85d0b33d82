//! JSON-RPC 2.0 framing for MCP.
//!
//! Every MCP exchange is a JSON-RPC request/response pair, except
//! notifications, which carry no `id` and get no response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision this client speaks.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

// ── MCP Methods ──────────────────────────────────────────────

/// MCP JSON-RPC method names used by this client.
pub mod methods {
    /// Open a session and negotiate capabilities.
    pub const INITIALIZE: &str = "initialize";

    /// Notification sent once the client has processed `initialize`.
    pub const INITIALIZED: &str = "notifications/initialized";

    /// Invoke a tool.
    pub const CALL_TOOL: &str = "tools/call";

    /// Enumerate tools (paginated).
    pub const LIST_TOOLS: &str = "tools/list";
}

/// Standard JSON-RPC error codes.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

// ── JSON-RPC Request ─────────────────────────────────────────

/// A JSON-RPC 2.0 request or notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// The method to invoke.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Request identifier; absent for notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl JsonRpcRequest {
    /// Create a request expecting a response.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Create a notification (no id, no response).
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            method: method.into(),
            params,
            id: None,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

// ── JSON-RPC Response ────────────────────────────────────────

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Must be "2.0".
    #[serde(default)]
    pub jsonrpc: String,

    /// The result (mutually exclusive with error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// The error (mutually exclusive with result).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// The request identifier; null when the server could not read it.
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    /// Interpret an incoming JSON value as a response. Returns `None` for
    /// server-initiated requests and notifications.
    pub fn from_message(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.contains_key("method") {
            return None;
        }
        if !obj.contains_key("result") && !obj.contains_key("error") {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Extract the result, returning the error if this is an error response.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ── JSON-RPC Error ───────────────────────────────────────────

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Whether the server is saying the method or tool does not exist.
    /// Servers disagree on the code for unknown tools, so the message is
    /// checked as well.
    pub fn is_not_found(&self) -> bool {
        if self.code == codes::METHOD_NOT_FOUND {
            return true;
        }
        let message = self.message.to_lowercase();
        message.contains("unknown tool") || message.contains("tool not found")
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

// ── Request ID ───────────────────────────────────────────────

/// JSON-RPC request identifier (number or string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_has_no_id() {
        let n = JsonRpcRequest::notification(methods::INITIALIZED, None);
        let json = serde_json::to_value(&n).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("params").is_none());
        assert_eq!(json["method"], "notifications/initialized");
        assert!(n.is_notification());
    }

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(
            RequestId::Number(7),
            methods::CALL_TOOL,
            Some(json!({"name": "get_products", "arguments": {}})),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert_eq!(json["params"]["name"], "get_products");
    }

    #[test]
    fn test_from_message_filters_server_requests() {
        assert!(JsonRpcResponse::from_message(&json!({
            "jsonrpc": "2.0", "method": "notifications/progress", "params": {}
        }))
        .is_none());

        let resp = JsonRpcResponse::from_message(&json!({
            "jsonrpc": "2.0", "id": "abc", "result": {"ok": true}
        }))
        .unwrap();
        assert_eq!(resp.id, Some(RequestId::String("abc".into())));
        assert_eq!(resp.into_result().unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_error_response() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32601, "message": "Method not found"}
        }))
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "JSON-RPC error -32601: Method not found");
    }

    #[test]
    fn test_unknown_tool_by_message() {
        let err = JsonRpcError {
            code: codes::INVALID_PARAMS,
            message: "Unknown tool: get_widgets".into(),
            data: None,
        };
        assert!(err.is_not_found());
        let err = JsonRpcError {
            code: codes::INTERNAL_ERROR,
            message: "database down".into(),
            data: None,
        };
        assert!(!err.is_not_found());
    }
}
