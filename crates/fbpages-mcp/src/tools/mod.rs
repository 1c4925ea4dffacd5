//! Facebook Pages MCP tools
//!
//! This module provides the tools exposed by the server, grouped by the part
//! of the Graph API they talk to. Each tool maps its validated arguments onto
//! exactly one [`GraphClient`](crate::clients::GraphClient) call.

pub mod comments;
pub mod conversations;
pub mod insights;
pub mod pages;
pub mod photos;
pub mod posts;
pub mod videos;

pub use comments::*;
pub use conversations::*;
pub use insights::*;
pub use pages::*;
pub use photos::*;
pub use posts::*;
pub use videos::*;

use crate::server::{McpServerError, McpServerResult, Tool};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Get all available MCP tools, in catalog order.
///
/// # Example
///
/// ```rust,no_run
/// use fbpages_mcp::tools::all_tools;
///
/// let tools = all_tools();
/// println!("Available tools: {}", tools.len());
/// ```
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    let mut tools = Vec::new();

    // Pages (3)
    tools.extend(page_tools());

    // Posts (6)
    tools.extend(post_tools());

    // Comments (5)
    tools.extend(comment_tools());

    // Photos (3)
    tools.extend(photo_tools());

    // Videos (3)
    tools.extend(video_tools());

    // Insights (4)
    tools.extend(insight_tools());

    // Conversations (4)
    tools.extend(conversation_tools());

    tools
}

/// Decode validated arguments into a tool's parameter struct.
pub(crate) fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> McpServerResult<T> {
    serde_json::from_value(args).map_err(|e| McpServerError::InvalidArguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_count() {
        let tools = all_tools();
        // 3 pages + 6 posts + 5 comments + 3 photos + 3 videos + 4 insights + 4 conversations
        assert_eq!(tools.len(), 28, "Expected 28 total tools");
    }

    #[test]
    fn test_all_tools_unique_names() {
        let tools = all_tools();
        let mut names = std::collections::HashSet::new();

        for tool in tools {
            let def = tool.definition();
            assert!(
                names.insert(def.name.clone()),
                "Duplicate tool name: {}",
                def.name
            );
        }
    }

    #[test]
    fn test_every_tool_is_described() {
        for tool in all_tools() {
            let def = tool.definition();
            assert!(def.name.starts_with("fb_"), "{} lacks the fb_ prefix", def.name);
            assert!(!def.description.is_empty());
            assert!(def.annotations.is_some(), "{} has no annotations", def.name);
            assert_eq!(def.input_schema["type"], "object");

            // Every required field is a declared property.
            for field in def.required_fields() {
                assert!(
                    def.input_schema["properties"].get(field).is_some(),
                    "{} requires undeclared field {}",
                    def.name,
                    field
                );
            }
        }
    }

    #[test]
    fn test_destructive_tools_are_deletes() {
        for tool in all_tools() {
            let def = tool.definition();
            let destructive = def
                .annotations
                .as_ref()
                .and_then(|a| a.destructive_hint)
                .unwrap_or(false);
            assert_eq!(destructive, def.name.contains("_delete_"), "{}", def.name);
        }
    }

    #[test]
    fn test_parse_args_type_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Params {
            #[allow(dead_code)]
            is_hidden: bool,
        }

        let err = parse_args::<Params>(serde_json::json!({"is_hidden": "yes"})).unwrap_err();
        assert!(matches!(err, McpServerError::InvalidArguments(_)));
    }
}
