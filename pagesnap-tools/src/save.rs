use serde::{Deserialize, Serialize};

use crate::tools::ToolContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Success,
    Error,
}

/// Result of a save; the only thing that crosses the tool boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub status: SaveStatus,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveOutcome {
    fn success(file_path: String) -> Self {
        Self {
            status: SaveStatus::Success,
            file_path,
            message: None,
        }
    }

    fn error(file_path: String, message: impl Into<String>) -> Self {
        Self {
            status: SaveStatus::Error,
            file_path,
            message: Some(message.into()),
        }
    }
}

/// Input to one save.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRequest {
    pub target_path: String,
    /// Context to format; when absent the current page is snapshotted.
    pub raw_context: Option<String>,
    pub append_mode: bool,
    pub model_name: Option<String>,
}

/// Build context, generate the artifact, then persist it.
///
/// Nothing is written unless generation succeeded.
pub async fn save_artifact(ctx: &ToolContext, request: ArtifactRequest) -> SaveOutcome {
    let target = ctx.sink.resolve(&request.target_path);
    let shown = target.display().to_string();

    let context = match request.raw_context {
        Some(content) => content,
        None => match page_context(ctx).await {
            Ok(context) => context,
            Err(e) => return SaveOutcome::error(shown, format!("snapshot_failed: {e}")),
        },
    };

    let text = match ctx
        .formatter
        .format(&context, &target, request.model_name.as_deref())
        .await
    {
        Ok(text) => text,
        Err(e) => return SaveOutcome::error(shown, e.to_string()),
    };

    match ctx
        .sink
        .write(&request.target_path, &text, request.append_mode)
        .await
    {
        Ok(path) => SaveOutcome::success(path.display().to_string()),
        Err(e) => {
            tracing::warn!(target: "artifact.sink", path = %shown, error = %e, "write failed");
            SaveOutcome::error(shown, format!("write_failed: {e}"))
        }
    }
}

/// Snapshot the page and fall back to raw markup when the rendering is weak.
async fn page_context(ctx: &ToolContext) -> Result<String, pagesnap_web::SnapshotError> {
    let mut page = ctx.page.lock().await;
    let snapshot = ctx.controller.capture(&mut **page).await?;
    Ok(ctx.fallback.augment(snapshot.render(), &**page).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_json_shape() {
        let ok = serde_json::to_value(SaveOutcome::success("log/a.txt".into())).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "success", "file_path": "log/a.txt"}));

        let err = serde_json::to_value(SaveOutcome::error("a.csv".into(), "boom")).unwrap();
        assert_eq!(
            err,
            serde_json::json!({"status": "error", "file_path": "a.csv", "message": "boom"})
        );
    }
}
