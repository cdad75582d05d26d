//! Tool registration and dispatch.

use serde_json::Value;

use super::{save_file, webscraping, ToolContext, ToolDefinition, ToolError};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![webscraping::definition(), save_file::definition()]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        ctx: &ToolContext,
    ) -> Result<Value, ToolError> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));
        tracing::debug!(tool = name, "dispatching tool call");

        match name {
            "webscraping" => webscraping::execute(args, ctx).await,
            "save_file" => save_file::execute(args, ctx).await,
            _ => Err(ToolError::NotFound(name.to_string())),
        }
    }
}
