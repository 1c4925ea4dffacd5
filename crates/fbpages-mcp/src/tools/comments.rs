//! Comment MCP tools
//!
//! Tools for reading and moderating comments on posts and other objects.

use super::parse_args;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool to list comments on an object.
pub struct ListCommentsTool;

#[async_trait]
impl Tool for ListCommentsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_list_comments",
            "List comments on a Facebook post or object. Returns comment ID, message, author, time, like count, and hidden status.",
        )
        .with_category("comments")
        .with_annotations(ToolAnnotations::read_only("List Comments"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "object_id": {"type": "string", "description": "Post ID or object ID to get comments from"},
                "limit": {"type": "number", "description": "Number of comments to return (default: 25)"}
            },
            "required": ["object_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_list_comments"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: ListCommentsParams = parse_args(args)?;
        let comments = context
            .client
            .list_comments(&params.object_id, params.limit.as_ref())
            .await?;
        Ok(Value::Array(comments))
    }
}

#[derive(Debug, Deserialize)]
struct ListCommentsParams {
    object_id: String,
    limit: Option<Number>,
}

/// Tool to comment on a post as the page.
pub struct CreateCommentTool;

#[async_trait]
impl Tool for CreateCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_create_comment",
            "Add a comment to a Facebook post. The page will be shown as the comment author.",
        )
        .with_category("comments")
        .with_annotations(ToolAnnotations::mutating("Create Comment"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "object_id": {"type": "string", "description": "Post ID to comment on"},
                "message": {"type": "string", "description": "Comment text"}
            },
            "required": ["object_id", "message"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_create_comment"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: CreateCommentParams = parse_args(args)?;
        debug!("Commenting on {}", params.object_id);
        Ok(context
            .client
            .create_comment(&params.object_id, &params.message)
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct CreateCommentParams {
    object_id: String,
    message: String,
}

/// Tool to reply under an existing comment.
pub struct ReplyCommentTool;

#[async_trait]
impl Tool for ReplyCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_reply_comment",
            "Reply to an existing comment. Creates a threaded reply under the specified comment.",
        )
        .with_category("comments")
        .with_annotations(ToolAnnotations::mutating("Reply to Comment"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "comment_id": {"type": "string", "description": "Comment ID to reply to"},
                "message": {"type": "string", "description": "Reply text"}
            },
            "required": ["comment_id", "message"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_reply_comment"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: ReplyCommentParams = parse_args(args)?;
        Ok(context
            .client
            .reply_comment(&params.comment_id, &params.message)
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct ReplyCommentParams {
    comment_id: String,
    message: String,
}

/// Tool to delete a comment.
pub struct DeleteCommentTool;

#[async_trait]
impl Tool for DeleteCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_delete_comment",
            "Permanently delete a comment. This action cannot be undone.",
        )
        .with_category("comments")
        .with_annotations(ToolAnnotations::destructive("Delete Comment"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "comment_id": {"type": "string", "description": "Comment ID to delete"}
            },
            "required": ["comment_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_delete_comment"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: CommentParams = parse_args(args)?;
        debug!("Deleting comment {}", params.comment_id);
        Ok(context.client.delete_comment(&params.comment_id).await?)
    }
}

#[derive(Debug, Deserialize)]
struct CommentParams {
    comment_id: String,
}

/// Tool to hide or unhide a comment.
pub struct HideCommentTool;

#[async_trait]
impl Tool for HideCommentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_hide_comment",
            "Hide or unhide a comment. Hidden comments are only visible to the author and page admins. Useful for moderation.",
        )
        .with_category("comments")
        .with_annotations(
            ToolAnnotations::mutating("Hide/Unhide Comment")
                .idempotent()
                .open_world(false),
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "comment_id": {"type": "string", "description": "Comment ID to hide/unhide"},
                "is_hidden": {"type": "boolean", "description": "true to hide, false to unhide"}
            },
            "required": ["comment_id", "is_hidden"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_hide_comment"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: HideCommentParams = parse_args(args)?;
        debug!(is_hidden = params.is_hidden, "Moderating comment {}", params.comment_id);
        Ok(context
            .client
            .hide_comment(&params.comment_id, params.is_hidden)
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct HideCommentParams {
    comment_id: String,
    is_hidden: bool,
}

/// Get all comment tools.
pub fn comment_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListCommentsTool),
        Arc::new(CreateCommentTool),
        Arc::new(ReplyCommentTool),
        Arc::new(DeleteCommentTool),
        Arc::new(HideCommentTool),
    ]
}
