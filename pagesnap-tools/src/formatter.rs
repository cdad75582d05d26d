use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pagesnap_common::{PagesnapError, DEFAULT_MODEL};
use pagesnap_config::{ArtifactSettings, FormatPreset};
use pagesnap_llm::{CompletionBackend, CompletionRequest, ProviderOverride};

/// User turn sent when there is no context at all.
pub const NO_CONTENT_PLACEHOLDER: &str = "(No page content available - page may not have loaded)";

const SOFT_FAILURE_PREFIX: &str = "formatting failed";

const CSV_GUIDANCE: &str = "You are a data extractor. Given page content, extract meaningful information and output it as valid CSV. \
Include a header row with column names like: Component, Description, Type, Details, etc. \
Extract key page elements, sections, content blocks, and their descriptions. \
Each row should describe a distinct part of the page structure or content. \
Follow CSV rules strictly: no newlines in cells, proper escaping. \
If page is blank/inaccessible, still provide at least one descriptive row.";

const PROSE_GUIDANCE: &str = "You are a formatter. Given source text, rewrite it into a well-structured output appropriate \
for the target file. Avoid raw HTML/DOM noise. \
Produce a clean, concise write-up that fits the user intent. \
If page is blank or inaccessible, say so.";

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("formatting_failed: {0}")]
    Generation(#[from] PagesnapError),

    #[error("formatting_failed: generation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with an error message instead of an artifact.
    #[error("{0}")]
    SoftFailure(String),
}

/// Prompt and output bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatterOptions {
    pub max_context_chars: usize,
    pub max_output_tokens: u32,
}

impl FormatterOptions {
    pub const PRIMARY: Self = Self {
        max_context_chars: 8000,
        max_output_tokens: 1200,
    };

    pub const LIGHT: Self = Self {
        max_context_chars: 6000,
        max_output_tokens: 800,
    };
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self::PRIMARY
    }
}

impl From<FormatPreset> for FormatterOptions {
    fn from(preset: FormatPreset) -> Self {
        match preset {
            FormatPreset::Primary => Self::PRIMARY,
            FormatPreset::Light => Self::LIGHT,
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Guidance matching the target file's extension.
pub fn system_guidance(target: &Path) -> &'static str {
    if is_csv(target) {
        CSV_GUIDANCE
    } else {
        PROSE_GUIDANCE
    }
}

/// Turns recovered page context into a task-appropriate artifact.
pub struct ArtifactFormatter {
    backend: Arc<dyn CompletionBackend>,
    options: FormatterOptions,
    default_model: String,
    generation_timeout: Duration,
}

impl ArtifactFormatter {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            options: FormatterOptions::PRIMARY,
            default_model: DEFAULT_MODEL.to_string(),
            generation_timeout: Duration::from_secs(60),
        }
    }

    pub fn from_settings(backend: Arc<dyn CompletionBackend>, settings: &ArtifactSettings) -> Self {
        Self::new(backend)
            .with_options(settings.preset.into())
            .with_default_model(&settings.model)
            .with_generation_timeout(Duration::from_secs(settings.generation_timeout_secs))
    }

    pub fn with_options(mut self, options: FormatterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_default_model(mut self, model: &str) -> Self {
        if !model.trim().is_empty() {
            self.default_model = model.to_string();
        }
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// The exact request [`Self::format`] would send.
    pub fn build_request(&self, context: &str, target: &Path, model: Option<&str>) -> CompletionRequest {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str())
            .to_string();

        let truncated: String = context.chars().take(self.options.max_context_chars).collect();
        let user_prompt = if truncated.is_empty() {
            NO_CONTENT_PLACEHOLDER.to_string()
        } else {
            truncated
        };

        CompletionRequest {
            system_prompt: system_guidance(target).to_string(),
            user_prompt,
            provider: ProviderOverride::for_model(&model),
            model,
            max_output_tokens: self.options.max_output_tokens,
        }
    }

    pub async fn format(
        &self,
        context: &str,
        target: &Path,
        model: Option<&str>,
    ) -> Result<String, FormatError> {
        let request = self.build_request(context, target, model);
        tracing::debug!(
            target: "artifact.format",
            model = %request.model,
            csv = is_csv(target),
            context_chars = request.user_prompt.chars().count(),
            "requesting artifact"
        );

        let text = tokio::time::timeout(self.generation_timeout, self.backend.complete(&request))
            .await
            .map_err(|_| FormatError::Timeout(self.generation_timeout))??;

        let text = text.trim().to_string();
        if text.to_lowercase().starts_with(SOFT_FAILURE_PREFIX) {
            tracing::warn!(target: "artifact.format", "backend returned an in-band failure");
            return Err(FormatError::SoftFailure(text));
        }
        Ok(text)
    }
}
