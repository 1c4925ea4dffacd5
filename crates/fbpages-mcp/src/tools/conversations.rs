//! Messenger MCP tools
//!
//! Reading page conversations and replying inside the messaging window.

use super::parse_args;
use super::photos::PagedParams;
use crate::server::{McpServerResult, Tool, ToolContext};
use crate::types::{ToolAnnotations, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool to list a page's Messenger conversations.
pub struct ListConversationsTool;

#[async_trait]
impl Tool for ListConversationsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_list_conversations",
            "List Messenger conversations for a Facebook Page. Returns conversation ID, last update time, snippet, message count, and participants.",
        )
        .with_category("conversations")
        .with_annotations(ToolAnnotations::read_only("List Conversations"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "limit": {"type": "number", "description": "Number of conversations to return (default: 25)"}
            },
            "required": ["page_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_list_conversations"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: PagedParams = parse_args(args)?;
        let conversations = context
            .client
            .list_conversations(&params.page_id, params.limit.as_ref())
            .await?;
        Ok(Value::Array(conversations))
    }
}

/// Tool to read the messages of one conversation.
pub struct GetMessagesTool;

#[async_trait]
impl Tool for GetMessagesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_get_messages",
            "Get messages from a specific Messenger conversation. Returns message ID, text, sender, and time.",
        )
        .with_category("conversations")
        .with_annotations(ToolAnnotations::read_only("Get Messages"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "conversation_id": {"type": "string", "description": "Conversation ID from fb_list_conversations"},
                "limit": {"type": "number", "description": "Number of messages to return (default: 25)"}
            },
            "required": ["conversation_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_get_messages"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: GetMessagesParams = parse_args(args)?;
        let messages = context
            .client
            .get_messages(&params.conversation_id, params.limit.as_ref())
            .await?;
        Ok(Value::Array(messages))
    }
}

#[derive(Debug, Deserialize)]
struct GetMessagesParams {
    conversation_id: String,
    limit: Option<Number>,
}

/// Tool to send a text message to a user.
pub struct SendMessageTool;

#[async_trait]
impl Tool for SendMessageTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_send_message",
            "Send a text message via Messenger to a user. Requires the recipient PSID (Page-Scoped ID). Note: 24-hour messaging window applies, so you can only respond within 24h of the user's last message.",
        )
        .with_category("conversations")
        .with_annotations(ToolAnnotations::mutating("Send Message"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "recipient_id": {
                    "type": "string",
                    "description": "Recipient PSID (Page-Scoped User ID). Found in conversation participants."
                },
                "text": {"type": "string", "description": "Message text to send (max 2000 characters)"}
            },
            "required": ["page_id", "recipient_id", "text"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_send_message"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: SendMessageParams = parse_args(args)?;
        debug!(recipient = %params.recipient_id, "Sending message from page {}", params.page_id);
        Ok(context
            .client
            .send_message(&params.page_id, &params.recipient_id, &params.text)
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageParams {
    page_id: String,
    recipient_id: String,
    text: String,
}

/// Tool to toggle the typing indicator.
pub struct SendTypingTool;

#[async_trait]
impl Tool for SendTypingTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "fb_send_typing",
            "Show or hide the typing indicator in Messenger. Use before sending a message for a more natural conversation feel.",
        )
        .with_category("conversations")
        .with_annotations(ToolAnnotations::mutating("Send Typing Indicator").open_world(false))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "page_id": {"type": "string", "description": "Facebook Page ID"},
                "recipient_id": {"type": "string", "description": "Recipient PSID (Page-Scoped User ID)"},
                "action": {
                    "type": "string",
                    "description": "Typing action: \"typing_on\", \"typing_off\", or \"mark_seen\" (default: typing_on)"
                }
            },
            "required": ["page_id", "recipient_id"]
        }))
    }

    #[instrument(skip_all, fields(tool = "fb_send_typing"))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<Value> {
        let params: SendTypingParams = parse_args(args)?;
        Ok(context
            .client
            .send_typing(&params.page_id, &params.recipient_id, params.action.as_deref())
            .await?)
    }
}

#[derive(Debug, Deserialize)]
struct SendTypingParams {
    page_id: String,
    recipient_id: String,
    action: Option<String>,
}

/// Get all conversation tools.
pub fn conversation_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListConversationsTool),
        Arc::new(GetMessagesTool),
        Arc::new(SendMessageTool),
        Arc::new(SendTypingTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_conversation_tools() {
        assert_eq!(conversation_tools().len(), 4);
    }

    #[test]
    fn test_send_message_requires_text() {
        assert_eq!(
            SendMessageTool.definition().required_fields(),
            vec!["page_id", "recipient_id", "text"]
        );
    }

    #[test]
    fn test_typing_action_is_optional() {
        let def = SendTypingTool.definition();
        assert!(!def.required_fields().contains(&"action"));
    }
}
