//! Video MCP tools

use super::parse_args;
use super::photos::PagedParams;
use crate::clients::graph::VideoUpload;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool to upload a video from a public URL.
pub struct UploadVideoTool;

#[async_trait]
impl Tool for UploadVideoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_upload_video",
            "Upload a video to a Facebook Page from a URL. Supports title and description. For large videos (>1GB), use chunked upload via Facebook UI.",
        )
        .with_category("videos")
        .with_annotations(ToolAnnotations::mutating("Upload Video"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "file_url": {"type": "string", "description": "Public URL of the video file to upload"},
                "title": {"type": "string", "description": "Video title"},
                "description": {"type": "string", "description": "Video description"}
            },
            "required": ["page_id", "file_url"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_upload_video"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: UploadVideoParams = parse_args(args)?;
        debug!("Uploading video to page {}", params.page_id);

        let video = VideoUpload {
            file_url: params.file_url,
            title: params.title,
            description: params.description,
        };
        Ok(context.client.upload_video(&params.page_id, &video).await?)
    }
}

#[derive(Debug, Deserialize)]
struct UploadVideoParams {
    page_id: String,
    file_url: String,
    title: Option<String>,
    description: Option<String>,
}

/// Tool to list a page's videos.
pub struct ListVideosTool;

#[async_trait]
impl Tool for ListVideosTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_list_videos",
            "List videos uploaded to a Facebook Page. Returns video ID, title, description, creation time, duration, and source URL.",
        )
        .with_category("videos")
        .with_annotations(ToolAnnotations::read_only("List Videos"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "limit": {"type": "number", "description": "Number of videos to return (default: 25)"}
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_list_videos"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PagedParams = parse_args(args)?;
        let videos = context
            .client
            .list_videos(&params.page_id, params.limit.as_ref())
            .await?;
        Ok(Value::Array(videos))
    }
}

/// Tool to delete a video.
pub struct DeleteVideoTool;

#[async_trait]
impl Tool for DeleteVideoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_delete_video",
            "Permanently delete a video from a Facebook Page.",
        )
        .with_category("videos")
        .with_annotations(ToolAnnotations::destructive("Delete Video"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "video_id": {"type": "string", "description": "Video ID to delete"}
            },
            "required": ["video_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_delete_video"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: DeleteVideoParams = parse_args(args)?;
        debug!("Deleting video {}", params.video_id);
        Ok(context.client.delete_video(&params.video_id).await?)
    }
}

#[derive(Debug, Deserialize)]
struct DeleteVideoParams {
    video_id: String,
}

/// Get all video tools.
pub fn video_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(UploadVideoTool),
        Arc::new(ListVideosTool),
        Arc::new(DeleteVideoTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_video_tools() {
        assert_eq!(video_tools().len(), 3);
    }

    #[test]
    fn test_upload_video_requires_file_url() {
        assert_eq!(
            UploadVideoTool.definition().required_fields(),
            vec!["page_id", "file_url"]
        );
    }
}
