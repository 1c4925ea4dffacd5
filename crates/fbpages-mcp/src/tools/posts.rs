//! Post MCP tools
//!
//! Tools for reading, publishing, editing, deleting, and scheduling posts on
//! a page feed.

use super::parse_args;
use crate::clients::graph::{NewPost, ScheduledPost};
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool to list posts from a page feed.
pub struct ListPostsTool;

#[async_trait]
impl Tool for ListPostsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_list_posts",
            "List posts from a Facebook Page feed. Returns post ID, message, creation time, picture, and permalink. Supports pagination via limit parameter.",
        )
        .with_category("posts")
        .with_annotations(ToolAnnotations::read_only("List Posts"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "limit": {"type": "number", "description": "Number of posts to return (default: 25, max: 100)"},
                "fields": {
                    "type": "string",
                    "description": "Comma-separated fields (e.g. \"id,message,created_time,shares,likes.summary(true)\")"
                }
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_list_posts"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: ListPostsParams = parse_args(args)?;
        debug!("Listing posts for page {}", params.page_id);
        let posts = context
            .client
            .list_posts(&params.page_id, params.limit.as_ref(), params.fields.as_deref())
            .await?;
        Ok(Value::Array(posts))
    }
}

#[derive(Debug, Deserialize)]
struct ListPostsParams {
    page_id: String,
    limit: Option<Number>,
    fields: Option<String>,
}

/// Tool to get a single post.
pub struct GetPostTool;

#[async_trait]
impl Tool for GetPostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_post",
            "Get details of a single Facebook post by ID. Returns message, creation time, picture, permalink, and engagement counts.",
        )
        .with_category("posts")
        .with_annotations(ToolAnnotations::read_only("Get Post"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {"type": "string", "description": "Facebook Post ID (format: pageId_postId)"},
                "fields": {
                    "type": "string",
                    "description": "Comma-separated fields to return (e.g. \"id,message,created_time,shares,likes.summary(true),comments.summary(true)\")"
                }
            },
            "required": ["post_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_post"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: GetPostParams = parse_args(args)?;
        Ok(context
            .client
            .get_post(&params.post_id, params.fields.as_deref())
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct GetPostParams {
    post_id: String,
    fields: Option<String>,
}

/// Tool to publish a new post.
pub struct CreatePostTool;

#[async_trait]
impl Tool for CreatePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_create_post",
            "Create a new post on a Facebook Page. Can include text message and/or link. Set published=false to create an unpublished (draft) post.",
        )
        .with_category("posts")
        .with_annotations(ToolAnnotations::mutating("Create Post"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID to post to"},
                "message": {"type": "string", "description": "Text content of the post"},
                "link": {"type": "string", "description": "URL to attach to the post (creates link preview)"},
                "published": {"type": "boolean", "description": "Set to false to create an unpublished/draft post (default: true)"}
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_create_post"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: CreatePostParams = parse_args(args)?;
        debug!("Creating post on page {}", params.page_id);

        let post = NewPost {
            message: params.message,
            link: params.link,
            published: params.published,
        };
        Ok(context.client.create_post(&params.page_id, &post).await?)
    }
}

#[derive(Debug, Deserialize)]
struct CreatePostParams {
    page_id: String,
    message: Option<String>,
    link: Option<String>,
    published: Option<bool>,
}

/// Tool to edit a post's message.
pub struct UpdatePostTool;

#[async_trait]
impl Tool for UpdatePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_update_post",
            "Update the text message of an existing Facebook post. Only the message field can be edited after creation.",
        )
        .with_category("posts")
        .with_annotations(ToolAnnotations::mutating("Update Post").idempotent().open_world(false))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {"type": "string", "description": "Facebook Post ID to update (format: pageId_postId)"},
                "message": {"type": "string", "description": "New text content for the post"}
            },
            "required": ["post_id", "message"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_update_post"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: UpdatePostParams = parse_args(args)?;
        Ok(context
            .client
            .update_post(&params.post_id, &params.message)
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct UpdatePostParams {
    post_id: String,
    message: String,
}

/// Tool to delete a post.
pub struct DeletePostTool;

#[async_trait]
impl Tool for DeletePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_delete_post",
            "Permanently delete a Facebook post. This action cannot be undone.",
        )
        .with_category("posts")
        .with_annotations(ToolAnnotations::destructive("Delete Post"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "post_id": {"type": "string", "description": "Facebook Post ID to delete (format: pageId_postId)"}
            },
            "required": ["post_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_delete_post"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PostParams = parse_args(args)?;
        debug!("Deleting post {}", params.post_id);
        Ok(context.client.delete_post(&params.post_id).await?)
    }
}

/// Arguments naming only a post.
#[derive(Debug, Deserialize)]
pub(crate) struct PostParams {
    pub(crate) post_id: String,
}

/// Tool to schedule a post for later publication.
pub struct SchedulePostTool;

#[async_trait]
impl Tool for SchedulePostTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_schedule_post",
            "Schedule a post to be published at a future time. The scheduled_time must be between 10 minutes and 75 days from now (Unix timestamp in seconds).",
        )
        .with_category("posts")
        .with_annotations(ToolAnnotations::mutating("Schedule Post"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "message": {"type": "string", "description": "Text content of the scheduled post"},
                "scheduled_time": {
                    "type": "number",
                    "description": "Unix timestamp (seconds) for when to publish. Must be 10min-75days from now."
                },
                "link": {"type": "string", "description": "Optional URL to attach to the post"}
            },
            "required": ["page_id", "message", "scheduled_time"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_schedule_post"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: SchedulePostParams = parse_args(args)?;
        debug!(
            scheduled_time = %params.scheduled_time,
            "Scheduling post on page {}", params.page_id
        );

        let post = ScheduledPost::new(params.message, params.scheduled_time).with_link(params.link);
        Ok(context.client.schedule_post(&params.page_id, &post).await?)
    }
}

#[derive(Debug, Deserialize)]
struct SchedulePostParams {
    page_id: String,
    message: String,
    scheduled_time: Number,
    link: Option<String>,
}

/// Get all post tools.
pub fn post_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListPostsTool),
        Arc::new(GetPostTool),
        Arc::new(CreatePostTool),
        Arc::new(UpdatePostTool),
        Arc::new(DeletePostTool),
        Arc::new(SchedulePostTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_post_tools() {
        assert_eq!(post_tools().len(), 6);
    }

    #[test]
    fn test_update_post_is_idempotent() {
        let hints = UpdatePostTool.definition().annotations.unwrap();
        assert_eq!(hints.idempotent_hint, Some(true));
        assert_eq!(hints.destructive_hint, Some(false));
    }

    #[test]
    fn test_schedule_time_kept_verbatim() {
        let params: SchedulePostParams = parse_args(serde_json::json!({
            "page_id": "1",
            "message": "hi",
            "scheduled_time": 1700000000.5
        }))
        .unwrap();
        assert_eq!(params.scheduled_time.to_string(), "1700000000.5");
    }
}
