//! Provider‑agnostic LLM integration for pagesnap.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with concrete
//! provider implementations for Ollama, OpenAI, and Gemini, plus the
//! [`CompletionBackend`] seam the artifact pipeline talks to. [`ModelRouter`]
//! implements that seam by picking a provider per request.
//!
//! # Examples
//! ```no_run
//! use pagesnap_common::LlmConfig;
//! use pagesnap_llm::{CompletionBackend, CompletionRequest, ModelRouter, ProviderOverride};
//!
//! # #[tokio::main]
//! # async fn main() -> pagesnap_common::Result<()> {
//! let router = ModelRouter::new(LlmConfig::default());
//! let model = "gpt-4o-mini".to_string();
//! let text = router
//!     .complete(&CompletionRequest {
//!         system_prompt: "You are a formatter.".into(),
//!         user_prompt: "Some page text".into(),
//!         provider: ProviderOverride::for_model(&model),
//!         model,
//!         max_output_tokens: 200,
//!     })
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod router;
pub mod traits;

pub use router::{CompletionBackend, CompletionRequest, ModelRouter, ProviderOverride};
