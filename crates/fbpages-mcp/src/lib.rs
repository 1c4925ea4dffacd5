//! # Facebook Pages MCP
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes the
//! Facebook Pages Graph API as tools, over stdio or Streamable HTTP.
//!
//! ## Overview
//!
//! The fbpages-mcp crate handles:
//! - **Tools**: 28 tool definitions across pages, posts, comments, photos,
//!   videos, insights, and Messenger conversations
//! - **JSON-RPC**: MCP protocol implementation
//! - **Clients**: HTTP client for the Graph API
//! - **Transports**: stdio and session-keyed Streamable HTTP
//!
//! ## MCP Protocol
//!
//! Supported methods:
//! - `initialize`: Initialize the MCP session
//! - `ping`: Liveness check
//! - `tools/list`: List available tools
//! - `tools/call`: Execute a tool
//!
//! Notifications are accepted and never answered.
//!
//! ## Tool Categories
//!
//! - `pages`: `fb_list_pages`, `fb_get_page`, `fb_get_page_token`
//! - `posts`: `fb_list_posts`, `fb_get_post`, `fb_create_post`, `fb_update_post`,
//!   `fb_delete_post`, `fb_schedule_post`
//! - `comments`: `fb_list_comments`, `fb_create_comment`, `fb_reply_comment`,
//!   `fb_delete_comment`, `fb_hide_comment`
//! - `photos`: `fb_upload_photo`, `fb_list_photos`, `fb_delete_photo`
//! - `videos`: `fb_upload_video`, `fb_list_videos`, `fb_delete_video`
//! - `insights`: `fb_get_page_insights`, `fb_get_post_insights`,
//!   `fb_get_page_fans`, `fb_get_page_views`
//! - `conversations`: `fb_list_conversations`, `fb_get_messages`,
//!   `fb_send_message`, `fb_send_typing`
//!
//! ## Usage
//!
//! ### Handling MCP Requests
//!
//! ```rust,no_run
//! use fbpages_mcp::{GraphConfig, McpServer, ToolCatalog};
//! use std::sync::Arc;
//!
//! async fn handle(json: &str) {
//!     let config = GraphConfig::from_env().unwrap();
//!     let server = McpServer::from_config(Arc::new(ToolCatalog::facebook()), &config).unwrap();
//!
//!     if let Some(response) = server.handle_message(json).await {
//!         println!("{}", serde_json::to_string(&response).unwrap());
//!     }
//! }
//! ```
//!
//! ### Calling a Tool Directly
//!
//! ```rust,no_run
//! use fbpages_mcp::{GraphConfig, McpServer, RemoteCredential, ToolCatalog};
//! use std::sync::Arc;
//!
//! async fn list_posts() {
//!     let config = GraphConfig::default().with_credential(RemoteCredential::new("token"));
//!     let server = McpServer::from_config(Arc::new(ToolCatalog::facebook()), &config).unwrap();
//!
//!     let posts = server
//!         .dispatch("fb_list_posts", serde_json::json!({"page_id": "123", "limit": 5}))
//!         .await;
//!     println!("{:?}", posts);
//! }
//! ```

pub mod catalog;
pub mod clients;
pub mod server;
pub mod status;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export main types
pub use catalog::ToolCatalog;
pub use server::{McpServer, McpServerError, McpServerResult, Tool, ToolContext};
pub use status::ServerStatus;
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ServerCapabilities, ServerInfo,
    ToolAnnotations, ToolCall, ToolCapabilities, ToolDefinition, ToolResult,
};

// Re-export the Graph API client
pub use clients::{ConfigError, GraphClient, GraphConfig, GraphError, RemoteCredential};

// Re-export tool collections
pub use tools::{
    all_tools, comment_tools, conversation_tools, insight_tools, page_tools, photo_tools,
    post_tools, video_tools,
};
