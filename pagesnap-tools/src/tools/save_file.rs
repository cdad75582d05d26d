//! `save_file` tool: write a generated artifact to disk.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ToolContext, ToolDefinition, ToolError};
use crate::save::{save_artifact, ArtifactRequest};

#[derive(Debug, Deserialize)]
struct SaveFileParams {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    append: bool,
    #[serde(default)]
    model_name: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "save_file".to_string(),
        description: Some(
            "Save provided text content to a file on disk. If content is omitted, first scrape the current page, \
then generate a clean, task-appropriate output (summary, notes, CSV, etc.) using the model. \
Avoid dumping raw scraped HTML/DOM. If file_path ends with .csv, output valid CSV text (header + rows) following CSV rules."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The text content to write. If omitted, the tool will scrape the current page and generate a clean, task-appropriate output (summary, notes, CSV, etc.) using the model."
                },
                "file_path": {
                    "type": "string",
                    "description": "Path to the file (relative or absolute). Defaults to log/agent_output.txt"
                },
                "append": {
                    "type": "boolean",
                    "description": "Append instead of overwrite (default: false)"
                }
            }
        }),
    }
}

pub async fn execute(args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
    let params: SaveFileParams =
        serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

    let outcome = save_artifact(
        ctx,
        ArtifactRequest {
            target_path: params.file_path.unwrap_or_default(),
            raw_context: params.content,
            append_mode: params.append,
            model_name: params.model_name,
        },
    )
    .await;
    Ok(serde_json::to_value(outcome)?)
}
