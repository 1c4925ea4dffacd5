//! Insights MCP tools
//!
//! Page and post analytics. Metric names and periods are passed to the Graph
//! API as given; unknown metrics come back as remote errors.

use super::pages::PageParams;
use super::parse_args;
use crate::clients::graph::InsightsQuery;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

const PERIOD_DESCRIPTION: &str =
    "Aggregation period: \"day\", \"week\", or \"days_28\" (default: day)";

/// Tool to query page-level metrics.
pub struct GetPageInsightsTool;

#[async_trait]
impl Tool for GetPageInsightsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_page_insights",
            "Get analytics metrics for a Facebook Page. Common metrics: page_impressions, page_engaged_users, page_post_engagements, page_fan_adds. Period: day, week, days_28.",
        )
        .with_category("insights")
        .with_annotations(ToolAnnotations::read_only("Get Page Insights"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "metric": {
                    "type": "string",
                    "description": "Comma-separated metrics (e.g. \"page_impressions,page_engaged_users,page_post_engagements\")"
                },
                "period": {"type": "string", "description": PERIOD_DESCRIPTION},
                "since": {"type": "string", "description": "Start date in YYYY-MM-DD format or Unix timestamp"},
                "until": {
                    "type": "string",
                    "description": "End date in YYYY-MM-DD format or Unix timestamp (max 90 days range)"
                }
            },
            "required": ["page_id", "metric"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_page_insights"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PageInsightsParams = parse_args(args)?;
        debug!(metric = %params.metric, "Querying insights for page {}", params.page_id);

        let query = InsightsQuery {
            metric: params.metric,
            period: params.period,
            since: params.since,
            until: params.until,
        };
        let metrics = context
            .client
            .get_page_insights(&params.page_id, &query)
            .await?;
        Ok(Value::Array(metrics))
    }
}

#[derive(Debug, Deserialize)]
struct PageInsightsParams {
    page_id: String,
    metric: String,
    period: Option<String>,
    since: Option<String>,
    until: Option<String>,
}

/// Tool to query metrics of a single post.
pub struct GetPostInsightsTool;

#[async_trait]
impl Tool for GetPostInsightsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_post_insights",
            "Get analytics for a specific post. Common metrics: post_impressions, post_engaged_users, post_clicks, post_reactions_by_type_total.",
        )
        .with_category("insights")
        .with_annotations(ToolAnnotations::read_only("Get Post Insights"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {"type": "string", "description": "Facebook Post ID (format: pageId_postId)"},
                "metric": {
                    "type": "string",
                    "description": "Comma-separated metrics (e.g. \"post_impressions,post_engaged_users,post_clicks\")"
                }
            },
            "required": ["post_id", "metric"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_post_insights"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PostInsightsParams = parse_args(args)?;
        let metrics = context
            .client
            .get_post_insights(&params.post_id, &params.metric)
            .await?;
        Ok(Value::Array(metrics))
    }
}

#[derive(Debug, Deserialize)]
struct PostInsightsParams {
    post_id: String,
    metric: String,
}

/// Tool to get the daily total fan count.
pub struct GetPageFansTool;

#[async_trait]
impl Tool for GetPageFansTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_page_fans",
            "Get total fan (follower) count for a Facebook Page over time. Returns daily values showing the total page likes.",
        )
        .with_category("insights")
        .with_annotations(ToolAnnotations::read_only("Get Page Fans"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"}
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_page_fans"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PageParams = parse_args(args)?;
        let metrics = context.client.get_page_fans(&params.page_id).await?;
        Ok(Value::Array(metrics))
    }
}

/// Tool to get page profile views.
pub struct GetPageViewsTool;

#[async_trait]
impl Tool for GetPageViewsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_page_views",
            "Get page view count over time. Returns total number of times the Page profile was viewed.",
        )
        .with_category("insights")
        .with_annotations(ToolAnnotations::read_only("Get Page Views"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "period": {"type": "string", "description": PERIOD_DESCRIPTION}
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_page_views"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PageViewsParams = parse_args(args)?;
        let metrics = context
            .client
            .get_page_views(&params.page_id, params.period.as_deref())
            .await?;
        Ok(Value::Array(metrics))
    }
}

#[derive(Debug, Deserialize)]
struct PageViewsParams {
    page_id: String,
    period: Option<String>,
}

/// Get all insight tools.
pub fn insight_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GetPageInsightsTool),
        Arc::new(GetPostInsightsTool),
        Arc::new(GetPageFansTool),
        Arc::new(GetPageViewsTool),
    ]
}
