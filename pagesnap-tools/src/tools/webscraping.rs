//! `webscraping` tool: snapshot the current page.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ToolContext, ToolDefinition, ToolError};

#[derive(Debug, Deserialize)]
struct WebscrapingParams {
    #[serde(default)]
    task_description: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "webscraping".to_string(),
        description: Some("Scrape content from the current web page".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "task_description": {
                    "type": "string",
                    "description": "The description of the webscraping task"
                }
            }
        }),
    }
}

pub async fn execute(args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
    let params: WebscrapingParams =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))?;
    if let Some(task) = params.task_description.as_deref() {
        tracing::info!(task, "webscraping");
    }

    let mut page = ctx.page.lock().await;
    let snapshot = ctx.controller.capture(&mut **page).await?;
    Ok(serde_json::to_value(snapshot)?)
}
