//! Common types and utilities shared across pagesnap crates.
//!
//! This crate defines the provider configuration, observability helpers, path
//! handling, and shared error types used throughout the pagesnap workspace.
//! It stays dependency‑minimal so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`LlmConfig`]: Provider‑agnostic LLM configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`paths`]: `~` expansion shared by the log sink and the artifact sink
//! - [`PagesnapError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use pagesnap_common::LlmConfig;
//!
//! let cfg = LlmConfig::default();
//! assert!(matches!(cfg, LlmConfig::OpenAi { .. }));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;
pub mod paths;

/// Model used when a caller does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the default LLM provider.
///
/// Model names are chosen per request; `model` here is only the fallback used
/// when building a standalone client. See the `pagesnap-llm` crate for the
/// concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmConfig {
    Ollama {
        base_url: String,
        model: String,
    },
    Gemini {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    OpenAi {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::OpenAi {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
        }
    }
}

/// Error types used across the pagesnap system.
#[derive(thiserror::Error, Debug)]
pub enum PagesnapError {
    /// A provider or tool failed to complete a requested operation.
    #[error("Agent error: {0}")]
    Agent(String),

    /// A driver (browser, network, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`PagesnapError`].
pub type Result<T> = std::result::Result<T, PagesnapError>;
