//! Photo MCP tools

use super::parse_args;
use crate::clients::graph::PhotoUpload;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool to upload a photo from a public URL.
pub struct UploadPhotoTool;

#[async_trait]
impl Tool for UploadPhotoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_upload_photo",
            "Upload a photo to a Facebook Page from a URL. Can include a caption. Set published=false for an unpublished photo (use in multi-photo posts).",
        )
        .with_category("photos")
        .with_annotations(ToolAnnotations::mutating("Upload Photo"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "url": {"type": "string", "description": "Public URL of the photo to upload"},
                "caption": {"type": "string", "description": "Caption text for the photo"},
                "published": {"type": "boolean", "description": "Set to false for unpublished photo (default: true)"}
            },
            "required": ["page_id", "url"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_upload_photo"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: UploadPhotoParams = parse_args(args)?;
        debug!("Uploading photo to page {}", params.page_id);

        // The Graph API takes the caption as the photo's message.
        let photo = PhotoUpload {
            url: params.url,
            message: params.caption,
            published: params.published,
        };
        Ok(context.client.upload_photo(&params.page_id, &photo).await?)
    }
}

#[derive(Debug, Deserialize)]
struct UploadPhotoParams {
    page_id: String,
    url: String,
    caption: Option<String>,
    published: Option<bool>,
}

/// Tool to list a page's photos.
pub struct ListPhotosTool;

#[async_trait]
impl Tool for ListPhotosTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_list_photos",
            "List photos uploaded to a Facebook Page. Returns photo ID, name, link, creation time, and image URLs at various sizes.",
        )
        .with_category("photos")
        .with_annotations(ToolAnnotations::read_only("List Photos"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "limit": {"type": "number", "description": "Number of photos to return (default: 25)"}
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_list_photos"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PagedParams = parse_args(args)?;
        let photos = context
            .client
            .list_photos(&params.page_id, params.limit.as_ref())
            .await?;
        Ok(Value::Array(photos))
    }
}

/// A page plus an optional page size.
#[derive(Debug, Deserialize)]
pub(crate) struct PagedParams {
    pub(crate) page_id: String,
    pub(crate) limit: Option<Number>,
}

/// Tool to delete a photo.
pub struct DeletePhotoTool;

#[async_trait]
impl Tool for DeletePhotoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_delete_photo",
            "Permanently delete a photo from a Facebook Page.",
        )
        .with_category("photos")
        .with_annotations(ToolAnnotations::destructive("Delete Photo"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "photo_id": {"type": "string", "description": "Photo ID to delete"}
            },
            "required": ["photo_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_delete_photo"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: DeletePhotoParams = parse_args(args)?;
        debug!("Deleting photo {}", params.photo_id);
        Ok(context.client.delete_photo(&params.photo_id).await?)
    }
}

#[derive(Debug, Deserialize)]
struct DeletePhotoParams {
    photo_id: String,
}

/// Get all photo tools.
pub fn photo_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(UploadPhotoTool),
        Arc::new(ListPhotosTool),
        Arc::new(DeletePhotoTool),
    ]
}
