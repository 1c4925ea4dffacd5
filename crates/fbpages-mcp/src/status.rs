//! Service status document served at `GET /` by the HTTP transport.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fbpages_mcp::{McpServer, ServerStatus, ToolCatalog};
//! use std::sync::Arc;
//!
//! let server = McpServer::new(Arc::new(ToolCatalog::facebook()), None);
//! let status = ServerStatus::new(&server, 0);
//! println!("{} tools, token configured: {}", status.tools, status.token_configured);
//! ```

use crate::server::McpServer;
use serde::{Deserialize, Serialize};

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// Accepting requests.
    Ok,
}

/// Endpoint paths exposed by the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    /// MCP endpoint path.
    pub mcp: String,
}

/// Status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Server name.
    pub name: String,

    /// Server version.
    pub version: String,

    /// Service state.
    pub status: ServiceState,

    /// Number of tools in the catalog.
    pub tools: usize,

    /// Transport name.
    pub transport: String,

    /// Endpoint paths.
    pub endpoints: Endpoints,

    /// Live HTTP sessions.
    pub sessions: usize,

    /// Whether a process-level access token is configured.
    pub token_configured: bool,

    /// Timestamp of the report (ISO 8601).
    pub timestamp: String,
}

impl ServerStatus {
    /// Build a report for `server` with `sessions` live sessions.
    pub fn new(server: &McpServer, sessions: usize) -> Self {
        Self {
            name: server.info().name.clone(),
            version: server.info().version.clone(),
            status: ServiceState::Ok,
            tools: server.list_tools().len(),
            transport: "streamable-http".to_string(),
            endpoints: Endpoints {
                mcp: "/mcp".to_string(),
            },
            sessions,
            token_configured: server.is_configured(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
