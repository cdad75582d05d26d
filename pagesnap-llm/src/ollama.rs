use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use pagesnap_common::{PagesnapError, Result};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client; the server is first contacted on `generate`.
    pub fn new(base_url: &str, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PagesnapError::Agent(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let url = format!("{}/api/generate", self.base_url);

        let mut options = serde_json::Map::new();
        if let Some(temp) = temperature {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tok) = max_tokens {
            options.insert("num_predict".to_string(), json!(max_tok));
        }

        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": options
        });
        if let Some(system) = system_prompt {
            payload["system"] = json!(system);
        }

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PagesnapError::Agent(format!("Generate request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(PagesnapError::Agent(format!(
                "Generate failed: HTTP {}",
                resp.status()
            )));
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| PagesnapError::Agent(format!("Failed to parse response: {}", e)))?;

        Ok(LlmResponse {
            text: val
                .get("response")
                .and_then(|r| r.as_str())
                .unwrap_or("")
                .to_string(),
            model: Some(self.model.clone()),
            tokens_used: val
                .get("eval_count")
                .and_then(|c| c.as_u64())
                .map(|c| c as u32),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
