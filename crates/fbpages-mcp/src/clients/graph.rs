//! Facebook Graph API client.
//!
//! HTTP client for the Facebook Graph API. Every operation performs exactly
//! one request, authenticated with the configured page access token passed as
//! the `access_token` query parameter. A response body carrying an `error`
//! object is a failure regardless of the HTTP status code.

use super::config::{GraphConfig, RemoteCredential};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Default projection for feed listings.
pub const POST_LIST_FIELDS: &str = "id,message,created_time,updated_time,full_picture,permalink_url";
/// Default projection for a single post.
pub const POST_FIELDS: &str = "id,message,created_time,updated_time,full_picture,permalink_url,shares";
/// Default projection for comments.
pub const COMMENT_FIELDS: &str = "id,message,from,created_time,like_count,is_hidden";
/// Default projection for photos.
pub const PHOTO_FIELDS: &str = "id,name,link,created_time,images";
/// Default projection for videos.
pub const VIDEO_FIELDS: &str = "id,title,description,created_time,length,source";
/// Default projection for Messenger conversations.
pub const CONVERSATION_FIELDS: &str = "id,updated_time,snippet,message_count,participants";
/// Default projection for Messenger messages.
pub const MESSAGE_FIELDS: &str = "id,message,from,created_time";

/// Graph client errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// HTTP request failed before a response body was read.
    #[error("HTTP request failed: {0}")]
    RequestFailed(reqwest::Error),

    /// The response body carried an `error` object.
    #[error("Facebook API Error ({}): {message}", code_label(.code))]
    Api {
        /// Error message from the API.
        message: String,
        /// Error type, e.g. `OAuthException`.
        error_type: Option<String>,
        /// Numeric error code.
        code: Option<i64>,
        /// Numeric error subcode.
        subcode: Option<i64>,
    },

    /// The request body could not be encoded.
    #[error("Could not encode request body: {0}")]
    InvalidRequest(String),

    /// The response body was not JSON.
    #[error("Invalid API response (HTTP {status}): {message}")]
    InvalidResponse {
        /// HTTP status code.
        status: u16,
        /// Parse failure detail.
        message: String,
    },
}

impl From<reqwest::Error> for GraphError {
    fn from(error: reqwest::Error) -> Self {
        // The request URL carries the access token.
        GraphError::RequestFailed(error.without_url())
    }
}

/// Graph API client bound to one credential.
#[derive(Clone)]
pub struct GraphClient {
    /// HTTP client instance.
    client: Client,

    /// Graph API base URL.
    base_url: String,

    /// Credential sent with every request.
    credential: RemoteCredential,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish()
    }
}

impl GraphClient {
    /// Create a new Graph client.
    pub fn new(config: &GraphConfig, credential: RemoteCredential) -> Result<Self, GraphError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential,
        })
    }

    /// Credential used by this client.
    pub fn credential(&self) -> &RemoteCredential {
        &self.credential
    }

    // ========== Pages ==========

    /// List the pages the token's user manages.
    #[instrument(skip(self))]
    pub async fn list_pages(&self) -> Result<Vec<Value>, GraphError> {
        let response = self.request(Method::GET, "me/accounts", None, Vec::new()).await?;
        Ok(collection(response))
    }

    /// Get a page, optionally projecting fields.
    #[instrument(skip(self))]
    pub async fn get_page(&self, page_id: &str, fields: Option<&str>) -> Result<Value, GraphError> {
        let mut params = Vec::new();
        push_param(&mut params, "fields", fields);
        self.request(Method::GET, page_id, None, params).await
    }

    /// Get a page's own access token.
    #[instrument(skip(self))]
    pub async fn get_page_token(&self, page_id: &str) -> Result<Value, GraphError> {
        self.request(Method::GET, page_id, None, vec![("fields", "access_token".to_string())])
            .await
    }

    // ========== Posts ==========

    /// List posts from a page feed.
    #[instrument(skip(self))]
    pub async fn list_posts(
        &self,
        page_id: &str,
        limit: Option<&Number>,
        fields: Option<&str>,
    ) -> Result<Vec<Value>, GraphError> {
        let fields = present(fields).unwrap_or(POST_LIST_FIELDS);
        let mut params = vec![("fields", fields.to_string())];
        push_limit(&mut params, limit);
        let response = self
            .request(Method::GET, &format!("{}/feed", page_id), None, params)
            .await?;
        Ok(collection(response))
    }

    /// Get a single post.
    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: &str, fields: Option<&str>) -> Result<Value, GraphError> {
        let params = vec![("fields", present(fields).unwrap_or(POST_FIELDS).to_string())];
        self.request(Method::GET, post_id, None, params).await
    }

    /// Publish (or draft) a post on a page feed.
    #[instrument(skip(self, post))]
    pub async fn create_post(&self, page_id: &str, post: &NewPost) -> Result<Value, GraphError> {
        self.request(
            Method::POST,
            &format!("{}/feed", page_id),
            Some(to_body(post)?),
            Vec::new(),
        )
        .await
    }

    /// Replace the message of an existing post.
    #[instrument(skip(self, message))]
    pub async fn update_post(&self, post_id: &str, message: &str) -> Result<Value, GraphError> {
        let body = serde_json::json!({ "message": message });
        self.request(Method::POST, post_id, Some(body), Vec::new()).await
    }

    /// Delete a post.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: &str) -> Result<Value, GraphError> {
        self.request(Method::DELETE, post_id, None, Vec::new()).await
    }

    /// Create an unpublished post that goes live at `scheduled_publish_time`.
    ///
    /// The timestamp is forwarded as given; the Graph API enforces its window.
    #[instrument(skip(self, post))]
    pub async fn schedule_post(
        &self,
        page_id: &str,
        post: &ScheduledPost,
    ) -> Result<Value, GraphError> {
        self.request(
            Method::POST,
            &format!("{}/feed", page_id),
            Some(to_body(post)?),
            Vec::new(),
        )
        .await
    }

    // ========== Comments ==========

    /// List comments on a post or other object.
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        object_id: &str,
        limit: Option<&Number>,
    ) -> Result<Vec<Value>, GraphError> {
        let mut params = vec![("fields", COMMENT_FIELDS.to_string())];
        push_limit(&mut params, limit);
        let response = self
            .request(Method::GET, &format!("{}/comments", object_id), None, params)
            .await?;
        Ok(collection(response))
    }

    /// Comment on an object as the page.
    #[instrument(skip(self, message))]
    pub async fn create_comment(&self, object_id: &str, message: &str) -> Result<Value, GraphError> {
        let body = serde_json::json!({ "message": message });
        self.request(Method::POST, &format!("{}/comments", object_id), Some(body), Vec::new())
            .await
    }

    /// Reply to a comment.
    #[instrument(skip(self, message))]
    pub async fn reply_comment(&self, comment_id: &str, message: &str) -> Result<Value, GraphError> {
        let body = serde_json::json!({ "message": message });
        self.request(Method::POST, &format!("{}/comments", comment_id), Some(body), Vec::new())
            .await
    }

    /// Delete a comment.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: &str) -> Result<Value, GraphError> {
        self.request(Method::DELETE, comment_id, None, Vec::new()).await
    }

    /// Hide or unhide a comment.
    #[instrument(skip(self))]
    pub async fn hide_comment(&self, comment_id: &str, is_hidden: bool) -> Result<Value, GraphError> {
        let body = serde_json::json!({ "is_hidden": is_hidden });
        self.request(Method::POST, comment_id, Some(body), Vec::new()).await
    }

    // ========== Photos ==========

    /// Upload a photo from a public URL.
    #[instrument(skip(self, photo))]
    pub async fn upload_photo(&self, page_id: &str, photo: &PhotoUpload) -> Result<Value, GraphError> {
        self.request(
            Method::POST,
            &format!("{}/photos", page_id),
            Some(to_body(photo)?),
            Vec::new(),
        )
        .await
    }

    /// List photos uploaded to a page.
    #[instrument(skip(self))]
    pub async fn list_photos(
        &self,
        page_id: &str,
        limit: Option<&Number>,
    ) -> Result<Vec<Value>, GraphError> {
        let mut params = vec![("fields", PHOTO_FIELDS.to_string())];
        push_limit(&mut params, limit);
        let response = self
            .request(Method::GET, &format!("{}/photos", page_id), None, params)
            .await?;
        Ok(collection(response))
    }

    /// Delete a photo.
    #[instrument(skip(self))]
    pub async fn delete_photo(&self, photo_id: &str) -> Result<Value, GraphError> {
        self.request(Method::DELETE, photo_id, None, Vec::new()).await
    }

    // ========== Videos ==========

    /// Upload a video from a public URL.
    #[instrument(skip(self, video))]
    pub async fn upload_video(&self, page_id: &str, video: &VideoUpload) -> Result<Value, GraphError> {
        self.request(
            Method::POST,
            &format!("{}/videos", page_id),
            Some(to_body(video)?),
            Vec::new(),
        )
        .await
    }

    /// List videos uploaded to a page.
    #[instrument(skip(self))]
    pub async fn list_videos(
        &self,
        page_id: &str,
        limit: Option<&Number>,
    ) -> Result<Vec<Value>, GraphError> {
        let mut params = vec![("fields", VIDEO_FIELDS.to_string())];
        push_limit(&mut params, limit);
        let response = self
            .request(Method::GET, &format!("{}/videos", page_id), None, params)
            .await?;
        Ok(collection(response))
    }

    /// Delete a video.
    #[instrument(skip(self))]
    pub async fn delete_video(&self, video_id: &str) -> Result<Value, GraphError> {
        self.request(Method::DELETE, video_id, None, Vec::new()).await
    }

    // ========== Insights ==========

    /// Query page-level metrics.
    #[instrument(skip(self), fields(metric = %query.metric))]
    pub async fn get_page_insights(
        &self,
        page_id: &str,
        query: &InsightsQuery,
    ) -> Result<Vec<Value>, GraphError> {
        let mut params = vec![("metric", query.metric.clone())];
        push_param(&mut params, "period", query.period.as_deref());
        push_param(&mut params, "since", query.since.as_deref());
        push_param(&mut params, "until", query.until.as_deref());
        self.insights(page_id, params).await
    }

    /// Query post-level metrics.
    #[instrument(skip(self))]
    pub async fn get_post_insights(&self, post_id: &str, metric: &str) -> Result<Vec<Value>, GraphError> {
        self.insights(post_id, vec![("metric", metric.to_string())]).await
    }

    /// Daily total fan count.
    #[instrument(skip(self))]
    pub async fn get_page_fans(&self, page_id: &str) -> Result<Vec<Value>, GraphError> {
        let params = vec![
            ("metric", "page_fans".to_string()),
            ("period", "day".to_string()),
        ];
        self.insights(page_id, params).await
    }

    /// Page profile views, per `period` (default `day`).
    #[instrument(skip(self))]
    pub async fn get_page_views(
        &self,
        page_id: &str,
        period: Option<&str>,
    ) -> Result<Vec<Value>, GraphError> {
        let params = vec![
            ("metric", "page_views_total".to_string()),
            ("period", present(period).unwrap_or("day").to_string()),
        ];
        self.insights(page_id, params).await
    }

    async fn insights(
        &self,
        object_id: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<Vec<Value>, GraphError> {
        let response = self
            .request(Method::GET, &format!("{}/insights", object_id), None, params)
            .await?;
        Ok(collection(response))
    }

    // ========== Conversations ==========

    /// List Messenger conversations of a page.
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        page_id: &str,
        limit: Option<&Number>,
    ) -> Result<Vec<Value>, GraphError> {
        let mut params = vec![("fields", CONVERSATION_FIELDS.to_string())];
        push_limit(&mut params, limit);
        let response = self
            .request(Method::GET, &format!("{}/conversations", page_id), None, params)
            .await?;
        Ok(collection(response))
    }

    /// List messages in a conversation.
    #[instrument(skip(self))]
    pub async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<&Number>,
    ) -> Result<Vec<Value>, GraphError> {
        let mut params = vec![("fields", MESSAGE_FIELDS.to_string())];
        push_limit(&mut params, limit);
        let response = self
            .request(Method::GET, &format!("{}/messages", conversation_id), None, params)
            .await?;
        Ok(collection(response))
    }

    /// Send a text message as a response inside the messaging window.
    #[instrument(skip(self, text))]
    pub async fn send_message(
        &self,
        page_id: &str,
        recipient_id: &str,
        text: &str,
    ) -> Result<Value, GraphError> {
        let body = serde_json::json!({
            "recipient": { "id": recipient_id },
            "message": { "text": text },
            "messaging_type": "RESPONSE"
        });
        self.request(Method::POST, &format!("{}/messages", page_id), Some(body), Vec::new())
            .await
    }

    /// Send a sender action (`typing_on`, `typing_off`, `mark_seen`).
    #[instrument(skip(self))]
    pub async fn send_typing(
        &self,
        page_id: &str,
        recipient_id: &str,
        action: Option<&str>,
    ) -> Result<Value, GraphError> {
        let body = serde_json::json!({
            "recipient": { "id": recipient_id },
            "sender_action": action.unwrap_or("typing_on")
        });
        self.request(Method::POST, &format!("{}/messages", page_id), Some(body), Vec::new())
            .await
    }

    /// Perform one Graph API request and surface a body `error` as a failure.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        params: Vec<(&'static str, String)>,
    ) -> Result<Value, GraphError> {
        debug!(method = %method, path = path, "Graph API request");

        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self
            .client
            .request(method, &url)
            .query(&[("access_token", self.credential.access_token.as_str())])
            .query(&params);

        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            warn!(status = status.as_u16(), path = path, "Graph API returned a non-JSON body");
            GraphError::InvalidResponse {
                status: status.as_u16(),
                message: e.to_string(),
            }
        })?;

        if let Some(error) = value.get("error") {
            let error = api_error(error);
            warn!(status = status.as_u16(), path = path, error = %error, "Graph API error");
            return Err(error);
        }

        Ok(value)
    }
}

/// Body for a new feed post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    /// Post text.
    #[serde(skip_serializing_if = "is_blank")]
    pub message: Option<String>,

    /// Link to attach.
    #[serde(skip_serializing_if = "is_blank")]
    pub link: Option<String>,

    /// `false` creates an unpublished draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Body for a scheduled feed post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    /// Post text.
    pub message: String,

    /// Always `false`: the post is held until the scheduled time.
    pub published: bool,

    /// Unix timestamp (seconds), forwarded verbatim.
    pub scheduled_publish_time: Number,

    /// Link to attach.
    #[serde(skip_serializing_if = "is_blank")]
    pub link: Option<String>,
}

impl ScheduledPost {
    /// Create a scheduled post body.
    pub fn new(message: impl Into<String>, scheduled_publish_time: Number) -> Self {
        Self {
            message: message.into(),
            published: false,
            scheduled_publish_time,
            link: None,
        }
    }

    /// Attach a link.
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }
}

/// Body for a photo upload by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUpload {
    /// Public URL of the image.
    pub url: String,

    /// Caption, sent as the photo's message.
    #[serde(skip_serializing_if = "is_blank")]
    pub message: Option<String>,

    /// `false` uploads without publishing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Body for a video upload by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoUpload {
    /// Public URL of the video file.
    pub file_url: String,

    /// Video title.
    #[serde(skip_serializing_if = "is_blank")]
    pub title: Option<String>,

    /// Video description.
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
}

/// Query for page insights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsQuery {
    /// Comma-separated metric names.
    pub metric: String,

    /// Aggregation period (`day`, `week`, `days_28`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,

    /// Range start (date or Unix timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    /// Range end (date or Unix timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

pub(crate) fn code_label(code: &Option<i64>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn to_body<T: Serialize>(body: &T) -> Result<Value, GraphError> {
    serde_json::to_value(body).map_err(|e| GraphError::InvalidRequest(e.to_string()))
}

/// A zero limit means "no limit" and is not sent.
fn push_limit(params: &mut Vec<(&'static str, String)>, limit: Option<&Number>) {
    if let Some(limit) = limit.filter(|l| l.as_f64() != Some(0.0)) {
        params.push(("limit", limit.to_string()));
    }
}

fn push_param(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = present(value) {
        params.push((key, value.to_string()));
    }
}

/// Empty strings count as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Extract the `data` array of a collection response.
fn collection(response: Value) -> Vec<Value> {
    match response {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn api_error(error: &Value) -> GraphError {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .unwrap_or("Unknown error")
        .to_string();

    GraphError::Api {
        message,
        error_type: error.get("type").and_then(|t| t.as_str()).map(String::from),
        code: error.get("code").and_then(|c| c.as_i64()),
        subcode: error.get("error_subcode").and_then(|c| c.as_i64()),
    }
}
