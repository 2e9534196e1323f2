//! Core tool abstraction: the [`ToolDefinition`] trait, [`ToolOutput`], and [`ToolInfo`].
//!
//! Every automation action the server exposes implements [`ToolDefinition`].
//! The trait is `Send + Sync` so tools can be stored in a shared registry
//! and dispatched from any async task.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution budget applied when a tool does not override [`ToolDefinition::timeout`]
/// and the request carries no explicit deadline.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// A named automation action invocable through the dispatcher.
///
/// Implementations must be `Send + Sync` so the registry can hand out
/// `Arc<dyn ToolDefinition>` across tasks.
#[async_trait::async_trait]
pub trait ToolDefinition: Send + Sync {
    /// Unique, stable name (alphanumeric + underscores, max 64 chars).
    fn name(&self) -> &str;

    /// Short description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the valid input for [`Self::execute`].
    fn input_schema(&self) -> serde_json::Value;

    /// Default execution budget for one invocation. A deadline on the
    /// request overrides this.
    fn timeout(&self) -> Duration {
        DEFAULT_TOOL_TIMEOUT
    }

    /// Run the tool with validated input and return structured output.
    ///
    /// Faults raised here never cross the dispatch boundary raw -- the
    /// dispatcher normalizes them into the failure envelope.
    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput>;
}

/// Structured output returned by a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    /// The structured result of the tool invocation.
    pub result: serde_json::Value,
    /// Optional base64-encoded binary content (e.g., screenshot PNG).
    pub content: Option<String>,
    /// Execution metadata attached to every success.
    pub metadata: ToolOutputMetadata,
}

/// Execution metadata attached to every [`ToolOutput`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOutputMetadata {
    /// Wall-clock execution time in milliseconds.
    pub latency_ms: u64,
    /// When the tool finished.
    pub completed_at: DateTime<Utc>,
    /// Bytes transferred during execution, if applicable.
    pub bytes_transferred: Option<u64>,
}

impl ToolOutputMetadata {
    /// Metadata stamped at completion time.
    pub fn finished(latency_ms: u64, bytes_transferred: Option<u64>) -> Self {
        Self {
            latency_ms,
            completed_at: Utc::now(),
            bytes_transferred,
        }
    }
}

/// Summary information about a registered tool (returned by registry listing).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Maximum allowed length for a tool name.
const MAX_TOOL_NAME_LEN: usize = 64;

/// Validate that a tool name contains only alphanumeric characters and
/// underscores, is non-empty, and does not exceed [`MAX_TOOL_NAME_LEN`].
pub fn validate_tool_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("tool name must not be empty");
    }
    if name.len() > MAX_TOOL_NAME_LEN {
        anyhow::bail!("tool name exceeds maximum length of {MAX_TOOL_NAME_LEN} characters: {name}");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("tool name must contain only alphanumeric characters and underscores: {name}");
    }
    Ok(())
}

/// Validate that an input schema is a JSON object with a `"type"` field.
pub fn validate_input_schema(schema: &serde_json::Value) -> Result<()> {
    let obj = schema
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("input schema must be a JSON object"))?;
    if !obj.contains_key("type") {
        anyhow::bail!("input schema must contain a \"type\" field");
    }
    Ok(())
}
