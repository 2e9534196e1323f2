//! The tool registry.
//!
//! [`ToolRegistry`] maps stable tool names to handlers. Registration happens
//! once at process startup and fails fast on duplicates; after startup the
//! registry is only read. Tools are stored as `Arc<dyn ToolDefinition>` so
//! lookups hand out shared references and never hold the lock during
//! execution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};

use crate::definition::{validate_input_schema, validate_tool_name, ToolDefinition, ToolInfo};

#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn ToolDefinition>>>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tool. Rejects duplicate names, invalid names, and invalid
    /// input schemas. Called only during startup wiring; a duplicate here is
    /// a programming error the process should refuse to start over.
    pub fn register(&self, tool: Box<dyn ToolDefinition>) -> Result<()> {
        let name = tool.name().to_string();
        validate_tool_name(&name)?;
        validate_input_schema(&tool.input_schema())?;

        let mut map = self
            .tools
            .write()
            .map_err(|e| anyhow::anyhow!("registry lock poisoned: {e}"))?;

        if map.contains_key(&name) {
            bail!("tool already registered: {name}");
        }

        map.insert(name, Arc::from(tool));
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn ToolDefinition>> {
        let map = self.tools.read().ok()?;
        map.get(name).cloned()
    }

    /// List all registered tools (sorted by name for deterministic output).
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let map = self.tools.read().expect("registry lock poisoned");
        let mut infos: Vec<ToolInfo> = map
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.read().expect("registry lock poisoned").len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ToolOutput, ToolOutputMetadata};

    struct FakeActionTool {
        tool_name: String,
        schema: serde_json::Value,
    }

    impl FakeActionTool {
        fn new(name: &str) -> Self {
            Self {
                tool_name: name.to_string(),
                schema: serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
            }
        }

        fn with_schema(mut self, schema: serde_json::Value) -> Self {
            self.schema = schema;
            self
        }
    }

    #[async_trait::async_trait]
    impl ToolDefinition for FakeActionTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn description(&self) -> &str {
            "fake automation action"
        }

        fn input_schema(&self) -> serde_json::Value {
            self.schema.clone()
        }

        async fn execute(&self, _input: serde_json::Value) -> anyhow::Result<ToolOutput> {
            Ok(ToolOutput {
                result: serde_json::json!({"tool": self.tool_name}),
                content: None,
                metadata: ToolOutputMetadata::finished(0, None),
            })
        }
    }

    #[test]
    fn register_and_list_sorted() {
        let registry = ToolRegistry::new();
        registry.register(Box::new(FakeActionTool::new("scroll"))).unwrap();
        registry.register(Box::new(FakeActionTool::new("click"))).unwrap();
        registry.register(Box::new(FakeActionTool::new("drag"))).unwrap();

        let tools = registry.list_tools();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0].name, "click");
        assert_eq!(tools[1].name, "drag");
        assert_eq!(tools[2].name, "scroll");
    }

    #[test]
    fn rejects_duplicate_registration() {
        let registry = ToolRegistry::new();
        registry.register(Box::new(FakeActionTool::new("click"))).unwrap();

        let err = registry
            .register(Box::new(FakeActionTool::new("click")))
            .unwrap_err();
        assert!(
            err.to_string().contains("already registered"),
            "expected duplicate error, got: {err}"
        );
        assert_eq!(registry.tool_count(), 1);
    }

    #[test]
    fn resolve_returns_the_same_handler_across_calls() {
        let registry = ToolRegistry::new();
        registry.register(Box::new(FakeActionTool::new("wait"))).unwrap();

        let first = registry.get_tool("wait").unwrap();
        let second = registry.get_tool("wait").unwrap();
        assert!(
            Arc::ptr_eq(&first, &second),
            "repeated lookups must share one handler"
        );
        assert!(registry.get_tool("nonexistent").is_none());
    }

    #[test]
    fn rejects_invalid_names() {
        let registry = ToolRegistry::new();
        for name in ["bad-name", "bad name", "bad;name", "../path", ""] {
            let tool = FakeActionTool {
                tool_name: name.to_string(),
                schema: serde_json::json!({"type": "object"}),
            };
            assert!(
                registry.register(Box::new(tool)).is_err(),
                "expected rejection for name: {name:?}"
            );
        }
    }

    #[test]
    fn rejects_invalid_schema() {
        let registry = ToolRegistry::new();

        let tool = FakeActionTool::new("bad_schema").with_schema(serde_json::json!("not an object"));
        assert!(registry.register(Box::new(tool)).is_err());

        let tool = FakeActionTool::new("missing_type").with_schema(serde_json::json!({"properties": {}}));
        assert!(registry.register(Box::new(tool)).is_err());
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(ToolRegistry::default().tool_count(), 0);
    }
}
