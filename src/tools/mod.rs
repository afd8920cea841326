//! Tool surface handed to the MCP host.

pub mod invoke;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition as advertised to the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Server namespace (e.g., "oci")
    pub server: String,
    /// Tool name (e.g., "invoke_cloud_operation")
    pub name: String,
    pub description: String,
    /// JSON Schema for tool input parameters
    pub input_schema: Value,
}

impl ToolDef {
    /// Namespaced tool name (e.g., "mcp.oci.invoke_cloud_operation")
    pub fn full_name(&self) -> String {
        format!("mcp.{}.{}", self.server, self.name)
    }

    /// Create an OpenAI-compatible tool schema for this tool
    pub fn to_openai_schema(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.full_name(),
                "description": format!("[MCP:{}] {}", self.server, self.description),
                "parameters": self.input_schema,
            }
        })
    }
}

/// Every tool this crate exposes, for the given server namespace
pub fn all(server: &str) -> Vec<ToolDef> {
    vec![invoke::definition(server)]
}
