//! Tests for the Streamable HTTP transport.
//!
//! Each test binds the router on an ephemeral loopback port and drives it
//! with reqwest, the same way an MCP client would.

use fbpages_mcp::transport::{self, AppState, SESSION_HEADER};
use fbpages_mcp::{GraphConfig, McpServer, ToolCatalog};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Running transport bound to a local port.
struct TestTransport {
    base_url: String,
    state: AppState,
    shutdown: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
    client: reqwest::Client,
}

impl TestTransport {
    async fn start(config: GraphConfig) -> Self {
        let server = McpServer::from_config(Arc::new(ToolCatalog::facebook()), &config)
            .expect("server should build");
        let state = AppState::new(server, config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(transport::serve(listener, state.clone(), shutdown.clone()));

        Self {
            base_url,
            state,
            shutdown,
            handle,
            client: reqwest::Client::new(),
        }
    }

    fn mcp_url(&self) -> String {
        format!("{}/mcp", self.base_url)
    }

    async fn initialize(&self) -> String {
        let response = self
            .client
            .post(self.mcp_url())
            .json(&initialize_body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response
            .headers()
            .get(SESSION_HEADER)
            .expect("session header")
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap().unwrap();
    }
}

fn initialize_body() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "0"}
        }
    })
}

#[tokio::test]
async fn test_status_document() {
    let transport = TestTransport::start(GraphConfig::default()).await;

    let status: Value = transport
        .client
        .get(format!("{}/", transport.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(status["status"], "ok");
    assert_eq!(status["tools"], 28);
    assert_eq!(status["transport"], "streamable-http");
    assert_eq!(status["endpoints"]["mcp"], "/mcp");
    assert_eq!(status["sessions"], 0);
    assert_eq!(status["token_configured"], false);

    transport.stop().await;
}

#[tokio::test]
async fn test_initialize_creates_session_and_reuse_routes_to_it() {
    let transport = TestTransport::start(GraphConfig::default()).await;

    let session_id = transport.initialize().await;
    assert_eq!(transport.state.registry.len().await, 1);
    assert!(transport.state.registry.get(&session_id).await.is_some());

    // Notification: accepted, no body.
    let response = transport
        .client
        .post(transport.mcp_url())
        .header(SESSION_HEADER, &session_id)
        .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    let response: Value = transport
        .client
        .post(transport.mcp_url())
        .header(SESSION_HEADER, &session_id)
        .json(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"]["tools"].as_array().unwrap().len(), 28);

    // Still one session.
    assert_eq!(transport.state.registry.len().await, 1);

    transport.stop().await;
}

#[tokio::test]
async fn test_unknown_session_is_rejected_without_creating_one() {
    let transport = TestTransport::start(GraphConfig::default()).await;

    let response = transport
        .client
        .post(transport.mcp_url())
        .header(SESSION_HEADER, "not-a-session")
        .json(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(body["error"]["message"], "Bad Request: No valid session ID provided");
    assert_eq!(body["id"], Value::Null);

    assert_eq!(transport.state.registry.len().await, 0);

    transport.stop().await;
}

#[tokio::test]
async fn test_non_initialize_without_session_is_rejected() {
    let transport = TestTransport::start(GraphConfig::default()).await;

    let response = transport
        .client
        .post(transport.mcp_url())
        .json(&json!({"jsonrpc": "2.0", "id": 5, "method": "tools/list"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(transport.state.registry.len().await, 0);

    transport.stop().await;
}

#[tokio::test]
async fn test_get_and_delete_require_known_session() {
    let transport = TestTransport::start(GraphConfig::default()).await;

    for request in [
        transport.client.get(transport.mcp_url()),
        transport.client.delete(transport.mcp_url()),
        transport
            .client
            .delete(transport.mcp_url())
            .header(SESSION_HEADER, "missing"),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(response.text().await.unwrap(), "Invalid or missing session ID");
    }

    transport.stop().await;
}

#[tokio::test]
async fn test_delete_closes_session() {
    let transport = TestTransport::start(GraphConfig::default()).await;

    let session_id = transport.initialize().await;
    let session = transport.state.registry.get(&session_id).await.unwrap();

    let response = transport
        .client
        .delete(transport.mcp_url())
        .header(SESSION_HEADER, &session_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(session.is_closed());
    assert_eq!(transport.state.registry.len().await, 0);

    // The ID is no longer routable.
    let response = transport
        .client
        .post(transport.mcp_url())
        .header(SESSION_HEADER, &session_id)
        .json(&json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    transport.stop().await;
}

#[tokio::test]
async fn test_sse_stream_ends_when_session_closes() {
    let transport = TestTransport::start(GraphConfig::default()).await;
    let session_id = transport.initialize().await;

    let response = transport
        .client
        .get(transport.mcp_url())
        .header(SESSION_HEADER, &session_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    transport.state.registry.close(&session_id).await;

    // Body completes once the session is closed.
    let body = tokio::time::timeout(std::time::Duration::from_secs(5), response.text())
        .await
        .expect("stream should end");
    assert!(body.is_ok());

    transport.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_all_sessions() {
    let transport = TestTransport::start(GraphConfig::default()).await;
    let first = transport.initialize().await;
    let second = transport.initialize().await;
    assert_ne!(first, second);

    let registry = Arc::clone(&transport.state.registry);
    let session = registry.get(&first).await.unwrap();

    transport.stop().await;

    assert!(session.is_closed());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_shutdown_completes_with_open_stream() {
    let transport = TestTransport::start(GraphConfig::default()).await;
    let session_id = transport.initialize().await;

    let stream = transport
        .client
        .get(transport.mcp_url())
        .header(SESSION_HEADER, &session_id)
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), 200);

    let registry = Arc::clone(&transport.state.registry);
    transport.shutdown.cancel();

    let served = tokio::time::timeout(std::time::Duration::from_secs(5), transport.handle)
        .await
        .expect("serve should return while a stream is open");
    served.unwrap().unwrap();
    assert!(registry.is_empty().await);

    // The stream body ends with the session.
    let body = tokio::time::timeout(std::time::Duration::from_secs(5), stream.text())
        .await
        .expect("stream should end");
    assert!(body.is_ok());
}

#[tokio::test]
async fn test_query_credential_scopes_to_one_session() {
    let graph = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/accounts"))
        .and(query_param("access_token", "session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "100", "name": "Bakery"}]
        })))
        .expect(1)
        .mount(&graph)
        .await;

    let transport = TestTransport::start(GraphConfig::default().with_base_url(graph.uri())).await;

    let response = transport
        .client
        .post(format!(
            "{}?FACEBOOK_PAGE_ACCESS_TOKEN=session-token&FACEBOOK_PAGE_ID=100",
            transport.mcp_url()
        ))
        .json(&initialize_body())
        .send()
        .await
        .unwrap();
    let scoped = response
        .headers()
        .get(SESSION_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let call = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": "fb_list_pages", "arguments": {}}
    });

    let result: Value = transport
        .client
        .post(transport.mcp_url())
        .header(SESSION_HEADER, &scoped)
        .json(&call)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["result"]["isError"], false);

    // A session opened without the query stays unconfigured.
    let plain = transport.initialize().await;
    let result: Value = transport
        .client
        .post(transport.mcp_url())
        .header(SESSION_HEADER, &plain)
        .json(&call)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["result"]["isError"], true);
    assert_eq!(
        result["result"]["structuredContent"]["error"]["kind"],
        "not_configured"
    );
    assert!(!transport.state.server.is_configured());

    transport.stop().await;
}
