//! Page MCP tools
//!
//! Tools for discovering the pages a token manages and reading page details.

use super::parse_args;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool to list the pages the user manages.
pub struct ListPagesTool;

#[async_trait]
impl Tool for ListPagesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_list_pages",
            "List all Facebook Pages the user manages. Returns page ID, name, category, and access token for each page. Use this to find the page_id for other tools.",
        )
        .with_category("pages")
        .with_annotations(ToolAnnotations::read_only("List Pages"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "_info": {
                    "type": "string",
                    "description": "No parameters required. Uses the configured Page Access Token to list all managed pages."
                }
            }
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_list_pages"))]
    async fn execute(&self, _args: Value, context: &ToolContext) -> McpServerResult<Value> {
        debug!("Listing managed pages");
        let pages = context.client.list_pages().await?;
        Ok(Value::Array(pages))
    }
}

/// Tool to get page details.
pub struct GetPageTool;

#[async_trait]
impl Tool for GetPageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_page",
            "Get detailed information about a Facebook Page: name, category, followers, fan count, about, description, website, and more.",
        )
        .with_category("pages")
        .with_annotations(ToolAnnotations::read_only("Get Page Info"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {
                    "type": "string",
                    "description": "Facebook Page ID (numeric). Use fb_list_pages to find this."
                },
                "fields": {
                    "type": "string",
                    "description": "Comma-separated fields to return (e.g. \"name,category,fan_count,followers_count,about,website\"). Default: all basic fields."
                }
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_page"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: GetPageParams = parse_args(args)?;
        debug!("Fetching page {}", params.page_id);
        Ok(context
            .client
            .get_page(&params.page_id, params.fields.as_deref())
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct GetPageParams {
    page_id: String,
    fields: Option<String>,
}

/// Tool to fetch a page's own access token.
pub struct GetPageTokenTool;

#[async_trait]
impl Tool for GetPageTokenTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_page_token",
            "Get the Page Access Token for a specific page. Useful when managing multiple pages, since each page has its own token.",
        )
        .with_category("pages")
        .with_annotations(ToolAnnotations::read_only("Get Page Token").open_world(false))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {
                    "type": "string",
                    "description": "Facebook Page ID to get the access token for"
                }
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_page_token"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PageParams = parse_args(args)?;
        Ok(context.client.get_page_token(&params.page_id).await?)
    }
}

/// Arguments naming only a page.
#[derive(Debug, Deserialize)]
pub(crate) struct PageParams {
    pub(crate) page_id: String,
}

/// Get all page tools.
pub fn page_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListPagesTool),
        Arc::new(GetPageTool),
        Arc::new(GetPageTokenTool),
    ]
}
