use std::io;
use std::path::{Path, PathBuf};

use pagesnap_common::paths::expand_home;
use tokio::io::AsyncWriteExt;

pub const DEFAULT_ARTIFACT_PATH: &str = "log/agent_output.txt";

/// Writes artifacts to plain UTF-8 files.
#[derive(Debug, Clone)]
pub struct FileSink {
    default_path: String,
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_PATH)
    }
}

impl FileSink {
    pub fn new(default_path: impl Into<String>) -> Self {
        Self {
            default_path: default_path.into(),
        }
    }

    /// Where a request for `requested` ends up: the default when empty, with
    /// `~` expanded.
    pub fn resolve(&self, requested: &str) -> PathBuf {
        let raw = if requested.trim().is_empty() {
            self.default_path.as_str()
        } else {
            requested
        };
        expand_home(Path::new(raw))
    }

    /// Overwrite (or append to) the resolved file, creating missing parents.
    /// Appended text always ends up newline terminated.
    pub async fn write(&self, requested: &str, text: &str, append: bool) -> io::Result<PathBuf> {
        let path = self.resolve(requested);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        if append && !text.ends_with('\n') {
            file.write_all(b"\n").await?;
        }
        file.flush().await?;

        tracing::info!(
            target: "artifact.sink",
            path = %path.display(),
            append,
            bytes = text.len(),
            "artifact written"
        );
        Ok(path)
    }
}
