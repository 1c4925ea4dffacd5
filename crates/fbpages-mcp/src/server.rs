//! MCP server implementation
//!
//! This module provides the protocol layer and the dispatch boundary. A
//! `tools/call` request is resolved against the [`ToolCatalog`], its
//! arguments are checked against the tool's input schema, and the tool runs
//! against the Graph API. Every outcome, including faults inside a tool, comes
//! back as a well-formed protocol response.

use crate::catalog::ToolCatalog;
use crate::clients::graph::code_label;
use crate::clients::{GraphClient, GraphConfig, GraphError, RemoteCredential};
use crate::types::*;
use crate::validation::validate_arguments;
use async_trait::async_trait;
use futures_util::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// MCP server error types.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Tool not found
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments do not match the tool's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No access token configured
    #[error("Facebook Page Access Token is not configured. Set FACEBOOK_PAGE_ACCESS_TOKEN.")]
    NotConfigured,

    /// The Graph API answered with an error body
    #[error("Facebook API Error ({}): {message}", code_label(.code))]
    RemoteApi {
        /// Remote error message, unmodified.
        message: String,
        /// Remote error code, unmodified.
        code: Option<i64>,
    },

    /// Network or parse failure talking to the Graph API
    #[error("Request to Facebook failed: {0}")]
    TransportFault(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpServerError {
    /// Numeric code of the failure, when the remote API supplied one.
    pub fn code(&self) -> Option<i64> {
        match self {
            McpServerError::RemoteApi { code, .. } => *code,
            _ => None,
        }
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            McpServerError::UnknownTool(_) => "unknown_tool",
            McpServerError::InvalidArguments(_) => "invalid_arguments",
            McpServerError::NotConfigured => "not_configured",
            McpServerError::RemoteApi { .. } => "remote_api_error",
            McpServerError::TransportFault(_) => "transport_fault",
            McpServerError::Internal(_) => "internal",
        }
    }
}

impl From<GraphError> for McpServerError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::Api { message, code, .. } => McpServerError::RemoteApi { message, code },
            other => McpServerError::TransportFault(other.to_string()),
        }
    }
}

/// Result type for MCP server operations.
pub type McpServerResult<T> = Result<T, McpServerError>;

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with arguments that already passed schema validation.
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value>;
}

/// Context for tool execution.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Graph API client bound to the caller's credential
    pub client: GraphClient,
}

impl ToolContext {
    /// Create a context around a configured client.
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Page used when none is named.
    pub fn default_page_id(&self) -> Option<&str> {
        self.client.credential().default_page_id.as_deref()
    }
}

/// MCP server.
///
/// Cheap to clone: the catalog is shared and the Graph client is reference
/// counted internally. One instance serves the stdio transport; the HTTP
/// transport creates one per session.
#[derive(Clone)]
pub struct McpServer {
    /// Server info
    info: ServerInfo,

    /// Server capabilities
    capabilities: ServerCapabilities,

    /// Tool catalog
    catalog: Arc<ToolCatalog>,

    /// Execution context, absent until a credential is configured
    context: Option<ToolContext>,
}

impl McpServer {
    /// Server name advertised to clients.
    pub const NAME: &'static str = "facebook-pages-mcp";

    /// Create a new MCP server.
    pub fn new(catalog: Arc<ToolCatalog>, context: Option<ToolContext>) -> Self {
        Self {
            info: ServerInfo {
                name: Self::NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities {
                    list_changed: false,
                }),
            },
            catalog,
            context,
        }
    }

    /// Create a server from Graph configuration.
    ///
    /// Without a credential the server still lists its tools; calls fail with
    /// [`McpServerError::NotConfigured`].
    pub fn from_config(catalog: Arc<ToolCatalog>, config: &GraphConfig) -> McpServerResult<Self> {
        let context = match config.credential.clone() {
            Some(credential) => Some(Self::build_context(config, credential)?),
            None => None,
        };
        Ok(Self::new(catalog, context))
    }

    /// Create a server bound to a specific credential, sharing this server's catalog.
    pub fn with_credential(
        &self,
        config: &GraphConfig,
        credential: RemoteCredential,
    ) -> McpServerResult<Self> {
        let context = Self::build_context(config, credential)?;
        Ok(Self::new(Arc::clone(&self.catalog), Some(context)))
    }

    fn build_context(config: &GraphConfig, credential: RemoteCredential) -> McpServerResult<ToolContext> {
        let client = GraphClient::new(config, credential)
            .map_err(|e| McpServerError::Internal(format!("could not build HTTP client: {}", e)))?;
        Ok(ToolContext::new(client))
    }

    /// Whether a credential is configured.
    pub fn is_configured(&self) -> bool {
        self.context.is_some()
    }

    /// Get all tool definitions in catalog order.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        self.catalog.list_tools()
    }

    /// Get the tool catalog.
    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    /// Resolve, validate, and execute a tool.
    ///
    /// Validation happens before the credential check and before any network
    /// I/O. A panic inside the tool is converted into
    /// [`McpServerError::Internal`].
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn dispatch(&self, name: &str, arguments: Value) -> McpServerResult<Value> {
        let (tool, definition) = self
            .catalog
            .get(name)
            .ok_or_else(|| McpServerError::UnknownTool(name.to_string()))?;

        let arguments = validate_arguments(&definition.input_schema, arguments)
            .map_err(McpServerError::InvalidArguments)?;

        let context = self.context.as_ref().ok_or(McpServerError::NotConfigured)?;

        debug!("Dispatching tool");

        match AssertUnwindSafe(tool.execute(arguments, context))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                error!("Tool panicked during execution");
                Err(McpServerError::Internal(
                    "tool execution failed unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Execute a tool and render the outcome as a protocol result.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        match self.dispatch(name, arguments).await {
            Ok(payload) => ToolResult::json(payload),
            Err(e) => {
                warn!(tool = name, kind = e.kind(), error = %e, "Tool call failed");
                ToolResult::error(format!("Error: {}", e)).with_structured(serde_json::json!({
                    "error": {
                        "kind": e.kind(),
                        "message": e.to_string(),
                        "code": e.code(),
                    }
                }))
            }
        }
    }

    /// Handle an MCP message. Notifications produce no response.
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let id = match request.id {
            Some(id) => id,
            None => {
                debug!(method = %request.method, "Notification received");
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => McpResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => McpResponse::error(id, McpError::method_not_found(&request.method)),
        };

        Some(response)
    }

    /// Parse and handle one raw JSON-RPC message.
    pub async fn handle_message(&self, raw: &str) -> Option<McpResponse> {
        match serde_json::from_str::<McpRequest>(raw) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "Unreadable JSON-RPC message");
                Some(McpResponse::error(RequestId::Null, McpError::parse_error()))
            }
        }
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> McpResponse {
        let requested = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str());
        let protocol_version = negotiate_protocol_version(requested);

        info!(protocol_version, configured = self.is_configured(), "Client initialized");

        McpResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": protocol_version,
                "capabilities": self.capabilities,
                "serverInfo": self.info,
                "instructions": self.instructions(),
            }),
        )
    }

    fn instructions(&self) -> String {
        let mut text = String::from(
            "Facebook Pages tools backed by the Graph API. Use fb_list_pages to find page IDs.",
        );
        match &self.context {
            Some(context) => {
                if let Some(page_id) = context.default_page_id() {
                    text.push_str(&format!(" The configured page is {}.", page_id));
                }
            }
            None => text.push_str(
                " No access token is configured yet; tool calls will fail until FACEBOOK_PAGE_ACCESS_TOKEN is set.",
            ),
        }
        text
    }

    fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        McpResponse::success(id, serde_json::json!({ "tools": self.list_tools() }))
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        let result = self.call_tool(&call.name, call.arguments).await;
        match serde_json::to_value(result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, McpError::internal_error(e.to_string())),
        }
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get server capabilities.
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("info", &self.info)
            .field("tools", &self.catalog.len())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("echo", "Echo the page id")
                .with_category("test")
                .with_schema(serde_json::json!({
                    "type": "object",
                    "properties": {"page_id": {"type": "string"}},
                    "required": ["page_id"]
                }))
        }

        async fn execute(&self, args: Value, _context: &ToolContext) -> McpServerResult<Value> {
            Ok(serde_json::json!({ "echo": args["page_id"] }))
        }
    }

    struct PanicTool;

    #[async_trait]
    impl Tool for PanicTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("boom", "Always panics")
        }

        async fn execute(&self, _args: Value, _context: &ToolContext) -> McpServerResult<Value> {
            panic!("boom");
        }
    }

    fn catalog() -> Arc<ToolCatalog> {
        Arc::new(ToolCatalog::new(vec![Arc::new(EchoTool), Arc::new(PanicTool)]))
    }

    fn configured() -> McpServer {
        let config = GraphConfig::default().with_credential(RemoteCredential::new("test-token"));
        McpServer::from_config(catalog(), &config).unwrap()
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = McpServer::new(catalog(), None);
        assert_eq!(server.info().name, "facebook-pages-mcp");
        assert!(!server.is_configured());
        assert_eq!(server.list_tools().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let result = configured().dispatch("nope", serde_json::json!({})).await;
        assert!(matches!(result, Err(McpServerError::UnknownTool(name)) if name == "nope"));
    }

    #[tokio::test]
    async fn test_dispatch_validates_before_credential_check() {
        let server = McpServer::new(catalog(), None);

        let missing = server.dispatch("echo", serde_json::json!({})).await;
        assert!(matches!(missing, Err(McpServerError::InvalidArguments(_))));

        let unconfigured = server.dispatch("echo", serde_json::json!({"page_id": "1"})).await;
        assert!(matches!(unconfigured, Err(McpServerError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let payload = configured()
            .dispatch("echo", serde_json::json!({"page_id": "123"}))
            .await
            .unwrap();
        assert_eq!(payload, serde_json::json!({"echo": "123"}));
    }

    #[tokio::test]
    async fn test_panicking_tool_becomes_internal_error() {
        let result = configured().dispatch("boom", Value::Null).await;
        assert!(matches!(result, Err(McpServerError::Internal(_))));
    }

    #[tokio::test]
    async fn test_call_tool_renders_failure() {
        let result = McpServer::new(catalog(), None)
            .call_tool("echo", serde_json::json!({"page_id": "1"}))
            .await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().starts_with("Error: "));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error"]["kind"], "not_configured");
    }

    #[test]
    fn test_graph_error_mapping() {
        let remote: McpServerError = GraphError::Api {
            message: "bad token".to_string(),
            error_type: Some("OAuthException".to_string()),
            code: Some(190),
            subcode: None,
        }
        .into();
        assert_eq!(remote.code(), Some(190));
        assert_eq!(remote.to_string(), "Facebook API Error (190): bad token");

        let fault: McpServerError = GraphError::InvalidResponse {
            status: 502,
            message: "expected value".to_string(),
        }
        .into();
        assert!(matches!(fault, McpServerError::TransportFault(_)));
        assert_eq!(fault.code(), None);
    }

    #[tokio::test]
    async fn test_handle_request() {
        let server = McpServer::new(catalog(), None);

        let req = McpRequest::new("1", "initialize")
            .with_params(serde_json::json!({"protocolVersion": "2025-03-26"}));
        let resp = server.handle_request(req).await.unwrap();

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "facebook-pages-mcp");
        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = McpServer::new(catalog(), None);
        let resp = server
            .handle_request(McpRequest::notification("notifications/initialized"))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method_and_parse_error() {
        let server = McpServer::new(catalog(), None);

        let resp = server.handle_request(McpRequest::new(7, "resources/list")).await.unwrap();
        assert_eq!(resp.error.unwrap().code, McpError::METHOD_NOT_FOUND);

        let resp = server.handle_message("{not json").await.unwrap();
        assert_eq!(resp.id, RequestId::Null);
        assert_eq!(resp.error.unwrap().code, McpError::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let server = configured();
        let resp = server.handle_request(McpRequest::new(2, "tools/call")).await.unwrap();
        assert_eq!(resp.error.unwrap().code, McpError::INVALID_PARAMS);
    }
}
