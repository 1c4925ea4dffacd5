//! Tool catalog.
//!
//! The catalog is built once at startup and never mutated. It keeps tools in
//! declaration order so that `tools/list` is stable across calls, and indexes
//! them by name for dispatch.

use crate::server::Tool;
use crate::tools::all_tools;
use crate::types::ToolDefinition;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Immutable registry of tools.
pub struct ToolCatalog {
    /// Tool implementations, in declaration order
    tools: Vec<Arc<dyn Tool>>,

    /// Definitions, parallel to `tools`
    definitions: Vec<ToolDefinition>,

    /// Name to position
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Build a catalog. The first tool registered under a name wins.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut catalog = Self {
            tools: Vec::with_capacity(tools.len()),
            definitions: Vec::with_capacity(tools.len()),
            index: HashMap::with_capacity(tools.len()),
        };

        for tool in tools {
            let definition = tool.definition();
            if catalog.index.contains_key(&definition.name) {
                warn!(tool = %definition.name, "Duplicate tool name ignored");
                continue;
            }
            catalog
                .index
                .insert(definition.name.clone(), catalog.tools.len());
            catalog.tools.push(tool);
            catalog.definitions.push(definition);
        }

        catalog
    }

    /// The full Facebook Pages catalog.
    pub fn facebook() -> Self {
        Self::new(all_tools())
    }

    /// All tool definitions, in declaration order.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Definitions belonging to a category.
    pub fn list_tools_by_category(&self, category: &str) -> Vec<&ToolDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.category.as_deref() == Some(category))
            .collect()
    }

    /// Distinct categories, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for category in self.definitions.iter().filter_map(|d| d.category.as_deref()) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Look up a tool and its definition by name.
    pub fn get(&self, name: &str) -> Option<(&Arc<dyn Tool>, &ToolDefinition)> {
        let position = *self.index.get(name)?;
        Some((&self.tools[position], &self.definitions[position]))
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
