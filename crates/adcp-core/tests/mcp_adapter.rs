//! MCP adapter and facade against a wiremock MCP server.

use std::sync::Arc;
use std::time::Duration;

use adcp_core::protocols::{McpAdapter, ProtocolAdapter};
use adcp_core::{
    AdcpClient, AdcpError, AgentConfig, ClientOptions, GetProductsRequest, Protocol, TaskResult,
    TaskStatus,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message}
    }))
}

/// Mount a minimal MCP agent at `mount_path`.
async fn mount_agent(server: &MockServer, mount_path: &str) {
    Mock::given(method("POST"))
        .and(path(mount_path))
        .and(body_partial_json(json!({"method": "initialize"})))
        .respond_with(rpc_result(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "experimental": {
                    "adcp": {"adcp_version": "2.4.0", "protocols_supported": ["media_buy"]}
                }
            },
            "serverInfo": {"name": "Test Sales Agent", "version": "1.2.0"},
            "instructions": "Sells run-of-site display"
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(mount_path))
        .and(body_partial_json(json!({"method": "notifications/initialized"})))
        .respond_with(ResponseTemplate::new(202))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(mount_path))
        .and(body_partial_json(json!({"method": "tools/list", "params": {"cursor": "page-2"}})))
        .respond_with(rpc_result(json!({"tools": [{"name": "create_media_buy"}]})))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(mount_path))
        .and(body_partial_json(json!({"method": "tools/list"})))
        .respond_with(rpc_result(json!({
            "tools": [{"name": "get_products"}],
            "nextCursor": "page-2"
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(mount_path))
        .and(body_partial_json(json!({
            "method": "tools/call",
            "params": {"name": "get_products"}
        })))
        .respond_with(rpc_result(json!({
            "content": [{"type": "text", "text": "{\"products\": [{\"product_id\": \"p1\", \"name\": \"Homepage\"}]}"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(mount_path))
        .and(body_partial_json(json!({
            "method": "tools/call",
            "params": {"name": "missing_tool"}
        })))
        .respond_with(rpc_error(-32601, "Unknown tool: missing_tool"))
        .mount(server)
        .await;
}

fn config(uri: &str) -> AgentConfig {
    AgentConfig::builder("sales", uri, Protocol::Mcp)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn rpc_method(request: &Request) -> Option<String> {
    let body: Value = serde_json::from_slice(&request.body).ok()?;
    body.get("method")?.as_str().map(String::from)
}

#[tokio::test]
async fn test_falls_back_to_mcp_suffix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_agent(&server, "/mcp").await;

    let client = AdcpClient::new(config(&server.uri())).unwrap();
    let result = client.get_products(&GetProductsRequest::with_brief("Coffee")).await;

    assert_eq!(result.status(), TaskStatus::Completed);
    assert_eq!(result.data().unwrap().products[0].product_id, "p1");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/");
    assert!(requests[1..].iter().all(|r| r.url.path() == "/mcp"));
}

#[tokio::test]
async fn test_configured_mcp_path_is_not_doubled() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let client = AdcpClient::new(config(&format!("{}/mcp", server.uri()))).unwrap();
    assert!(client.get_products(&GetProductsRequest::default()).await.success());

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/mcp"));
}

#[tokio::test]
async fn test_exhausted_candidates_raise_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = McpAdapter::new(Arc::new(config(&server.uri())));
    match adapter.call_tool("get_products", json!({})).await {
        Err(AdcpError::Connection { agent_id, message, .. }) => {
            assert_eq!(agent_id, "sales");
            assert!(message.contains("/mcp"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }

    // The facade turns the same failure into a result.
    let client = AdcpClient::new(config(&server.uri())).unwrap();
    let result = client.get_products(&GetProductsRequest::default()).await;
    assert_eq!(result.status(), TaskStatus::Failed);
}

#[tokio::test]
async fn test_unauthorized_raises_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let adapter = McpAdapter::new(Arc::new(config(&server.uri())));
    assert!(matches!(
        adapter.list_tools().await,
        Err(AdcpError::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_sends_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer s3cret"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "initialize"})))
        .respond_with(rpc_result(json!({"serverInfo": {"name": "Authed", "version": "1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer s3cret"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "notifications/initialized"})))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer s3cret"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({"method": "tools/list"})))
        .respond_with(rpc_result(json!({"tools": []})))
        .mount(&server)
        .await;

    let config = AgentConfig::builder("sales", format!("{}/mcp", server.uri()), Protocol::Mcp)
        .bearer_token("s3cret")
        .build()
        .unwrap();
    let adapter = McpAdapter::new(Arc::new(config));
    assert_eq!(adapter.list_tools().await.unwrap(), Vec::<String>::new());
}

#[tokio::test]
async fn test_list_tools_follows_cursor() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let client = AdcpClient::new(config(&format!("{}/mcp", server.uri()))).unwrap();
    assert_eq!(
        client.list_tools().await.unwrap(),
        vec!["get_products".to_string(), "create_media_buy".to_string()]
    );
}

#[tokio::test]
async fn test_agent_info_reads_handshake() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let client = AdcpClient::new(config(&format!("{}/mcp", server.uri()))).unwrap();
    let info = client.get_agent_info().await.unwrap();
    assert_eq!(info.name, "Test Sales Agent");
    assert_eq!(info.version.as_deref(), Some("1.2.0"));
    assert_eq!(info.description.as_deref(), Some("Sells run-of-site display"));
    assert_eq!(info.protocol, Protocol::Mcp);
    assert_eq!(info.adcp_version.as_deref(), Some("2.4.0"));
    assert_eq!(info.protocols_supported, vec!["media_buy".to_string()]);
    assert_eq!(info.tools.len(), 2);
}

#[tokio::test]
async fn test_unknown_tool() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let adapter = McpAdapter::new(Arc::new(config(&format!("{}/mcp", server.uri()))));
    assert!(matches!(
        adapter.call_tool("missing_tool", json!({})).await,
        Err(AdcpError::ToolNotFound { ref tool, .. }) if tool == "missing_tool"
    ));

    let client = AdcpClient::new(config(&format!("{}/mcp", server.uri()))).unwrap();
    let result = client.call_tool("missing_tool", json!({})).await;
    assert!(result.error().unwrap().contains("missing_tool"));
}

#[tokio::test]
async fn test_concurrent_first_calls_share_one_session() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let client = AdcpClient::new(config(&format!("{}/mcp", server.uri()))).unwrap();
    let request = GetProductsRequest::default();
    let (a, b, c) = tokio::join!(
        client.get_products(&request),
        client.get_products(&request),
        client.get_products(&request)
    );
    assert!(a.success() && b.success() && c.success());

    let requests = server.received_requests().await.unwrap();
    let initializes = requests
        .iter()
        .filter(|r| rpc_method(r).as_deref() == Some("initialize"))
        .count();
    assert_eq!(initializes, 1);
}

#[tokio::test]
async fn test_close_is_idempotent_and_reconnects() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let client = AdcpClient::new(config(&format!("{}/mcp", server.uri()))).unwrap();
    client.close().await.unwrap();
    assert!(client.get_products(&GetProductsRequest::default()).await.success());
    client.close().await.unwrap();
    client.close().await.unwrap();
    assert!(client.get_products(&GetProductsRequest::default()).await.success());

    let requests = server.received_requests().await.unwrap();
    let initializes = requests
        .iter()
        .filter(|r| rpc_method(r).as_deref() == Some("initialize"))
        .count();
    assert_eq!(initializes, 2);
}

#[tokio::test]
async fn test_debug_info_redacts_credentials() {
    let server = MockServer::start().await;
    mount_agent(&server, "/mcp").await;

    let config = AgentConfig::builder("sales", format!("{}/mcp", server.uri()), Protocol::Mcp)
        .auth_token("top-secret")
        .debug(true)
        .build()
        .unwrap();
    let client = AdcpClient::with_options(config, ClientOptions::default()).unwrap();
    let result = client.get_products(&GetProductsRequest::default()).await;

    let debug = match &result {
        TaskResult::Completed(c) => c.debug_info.clone().unwrap(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(debug.request["headers"]["x-adcp-auth"], "***");
    assert_eq!(debug.request["body"]["name"], "get_products");
    assert!(!serde_json::to_string(&debug).unwrap().contains("top-secret"));
}

#[tokio::test]
async fn test_slow_agent_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({})).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = AgentConfig::builder("sales", server.uri(), Protocol::Mcp)
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let client = AdcpClient::new(config).unwrap();

    let err = client.list_tools().await.unwrap_err();
    assert!(matches!(err, AdcpError::Timeout { .. }), "{err:?}");
    assert!(err.is_retryable());

    let result = client.get_products(&GetProductsRequest::default()).await;
    assert_eq!(result.status(), TaskStatus::Failed);
    assert!(result.error().unwrap().contains("timed out"));
}
