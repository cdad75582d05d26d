//! Per-request model routing behind a single completion capability.

use crate::gemini::{GeminiClient, GEMINI_BASE_URL};
use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;
use crate::traits::LlmClient;
use async_trait::async_trait;
use pagesnap_common::{LlmConfig, PagesnapError, Result};

/// Environment variable consulted for the Gemini credential.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Selects a provider other than the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOverride {
    /// Route to Gemini, optionally with an explicit credential.
    Gemini { api_key: Option<String> },
}

impl ProviderOverride {
    /// Models whose name mentions "gemini" go through the Gemini provider.
    ///
    /// ```
    /// use pagesnap_llm::ProviderOverride;
    ///
    /// assert!(ProviderOverride::for_model("Gemini-1.5-Flash").is_some());
    /// assert!(ProviderOverride::for_model("gpt-4o-mini").is_none());
    /// ```
    pub fn for_model(model: &str) -> Option<Self> {
        model
            .to_lowercase()
            .contains("gemini")
            .then(|| ProviderOverride::Gemini {
                api_key: std::env::var(GEMINI_API_KEY_ENV).ok(),
            })
    }
}

/// One system + user exchange with bounded output.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub provider: Option<ProviderOverride>,
}

/// The generation capability the artifact pipeline consumes.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// [`CompletionBackend`] that builds the right [`LlmClient`] for each request.
pub struct ModelRouter {
    default: LlmConfig,
    gemini_api_key: Option<String>,
    gemini_base_url: String,
}

impl ModelRouter {
    pub fn new(default: LlmConfig) -> Self {
        Self {
            default,
            gemini_api_key: None,
            gemini_base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Credential and endpoint for requests carrying a Gemini override.
    pub fn with_gemini(mut self, api_key: Option<String>, base_url: Option<String>) -> Self {
        self.gemini_api_key = api_key.filter(|k| !k.is_empty());
        if let Some(url) = base_url {
            self.gemini_base_url = url;
        }
        self
    }

    fn client_for(&self, request: &CompletionRequest) -> Result<Box<dyn LlmClient>> {
        let model = request.model.clone();
        if let Some(ProviderOverride::Gemini { api_key }) = &request.provider {
            let key = api_key
                .clone()
                .filter(|k| !k.is_empty())
                .or_else(|| self.gemini_api_key.clone())
                .ok_or_else(|| {
                    PagesnapError::Config(format!(
                        "{GEMINI_API_KEY_ENV} is required for model {model}"
                    ))
                })?;
            let client = GeminiClient::new(key, model)?.with_base_url(&self.gemini_base_url);
            return Ok(Box::new(client));
        }

        match &self.default {
            LlmConfig::OpenAi {
                api_key, base_url, ..
            } => {
                let mut client = OpenAiClient::new(api_key.clone(), model)?;
                if let Some(url) = base_url {
                    client = client.with_base_url(url.as_str());
                }
                Ok(Box::new(client))
            }
            LlmConfig::Gemini {
                api_key, base_url, ..
            } => {
                let client = GeminiClient::new(api_key.clone(), model)?
                    .with_base_url(base_url.as_deref().unwrap_or(&self.gemini_base_url));
                Ok(Box::new(client))
            }
            LlmConfig::Ollama { base_url, .. } => {
                Ok(Box::new(OllamaClient::new(base_url, model)?))
            }
            LlmConfig::None => Err(PagesnapError::Config("No LLM configured".to_string())),
        }
    }
}

#[async_trait]
impl CompletionBackend for ModelRouter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let client = self.client_for(request)?;
        tracing::debug!(
            target: "llm.router",
            model = client.model_name(),
            gemini_override = request.provider.is_some(),
            max_output_tokens = request.max_output_tokens,
            "dispatching completion"
        );
        let response = client
            .generate(
                &request.user_prompt,
                Some(&request.system_prompt),
                Some(request.max_output_tokens),
                None,
            )
            .await?;
        Ok(response.text)
    }
}
