//! Named, schema-described operations the agent can invoke.

use std::sync::Arc;

use pagesnap_config::PagesnapConfig;
use pagesnap_drivers::PageHandle;
use pagesnap_llm::CompletionBackend;
use pagesnap_web::{FallbackContextBuilder, SnapshotError, SnapshotRetryController};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::formatter::ArtifactFormatter;
use crate::sink::FileSink;

pub mod registry;
pub mod save_file;
pub mod webscraping;

pub use registry::ToolRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("could not serialize tool result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything a tool call needs. The page is held for a whole scrape
/// (including fallback) so extraction attempts never overlap.
pub struct ToolContext {
    pub page: Mutex<Box<dyn PageHandle>>,
    pub controller: SnapshotRetryController,
    pub fallback: FallbackContextBuilder,
    pub formatter: ArtifactFormatter,
    pub sink: FileSink,
}

impl ToolContext {
    pub fn new(
        page: Box<dyn PageHandle>,
        backend: Arc<dyn CompletionBackend>,
        config: &PagesnapConfig,
    ) -> Self {
        Self {
            page: Mutex::new(page),
            controller: SnapshotRetryController::from_settings(&config.extraction),
            fallback: FallbackContextBuilder::new(),
            formatter: ArtifactFormatter::from_settings(backend, &config.artifact),
            sink: FileSink::new(config.artifact.default_path.clone()),
        }
    }
}
