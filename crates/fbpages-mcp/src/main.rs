use anyhow::Context;
use clap::Parser;
use fbpages_mcp::transport::{self, AppState};
use fbpages_mcp::{GraphConfig, McpServer, ToolCatalog};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fbpages-mcp")]
#[command(version, about = "MCP server for Facebook Pages (Graph API)")]
#[command(long_about = "Exposes Facebook Page management as Model Context Protocol tools.\n\n\
By default the server speaks JSON-RPC over stdio. Pass --http to serve the \
Streamable HTTP transport on /mcp instead.\n\n\
Environment Variables:\n\
  FACEBOOK_PAGE_ACCESS_TOKEN   Page access token (tools report an error without it)\n\
  FACEBOOK_PAGE_ID             Default page ID (optional)\n\
  FACEBOOK_GRAPH_API_URL       Graph API base URL (optional)\n\
  FACEBOOK_TIMEOUT_SECS        Graph API request timeout (optional, default 30)\n\
  RUST_LOG                     Log filter (default: info)")]
struct Cli {
    /// Serve Streamable HTTP instead of stdio
    #[arg(long)]
    http: bool,

    /// HTTP port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// HTTP bind host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = GraphConfig::from_env().context("invalid Graph API configuration")?;
    if config.has_auth() {
        info!("Token: ***configured***");
    } else {
        warn!("Token: not configured yet; tool calls will fail until FACEBOOK_PAGE_ACCESS_TOKEN is set");
    }

    let catalog = Arc::new(ToolCatalog::facebook());
    let server = McpServer::from_config(catalog, &config).context("failed to build MCP server")?;
    info!(tools = server.list_tools().len(), "Facebook Pages MCP server starting");

    if cli.http {
        serve_http(&cli, server, config).await
    } else {
        transport::serve_stdio(server)
            .await
            .context("stdio transport failed")
    }
}

async fn serve_http(cli: &Cli, server: McpServer, config: GraphConfig) -> anyhow::Result<()> {
    let address = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!("MCP endpoint: http://{}/mcp", address);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutting down...");
                    shutdown.cancel();
                }
                Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
            }
        }
    });

    transport::serve(listener, AppState::new(server, config), shutdown)
        .await
        .context("HTTP transport failed")
}
