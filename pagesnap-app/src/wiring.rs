use std::path::Path;

use pagesnap_common::LlmConfig;
use pagesnap_common::observability::{LogConfig, LogFormat};
use pagesnap_common::paths::expand_home;
use pagesnap_config::{BrowserSettings, LlmProvider, LlmSettings, LoggingSettings, StealthLevel};
use pagesnap_drivers::snap_browser::driver::DriverOptions;
use pagesnap_drivers::snap_browser::stealth::StealthProfile;
use pagesnap_llm::ModelRouter;

pub fn log_config(settings: &LoggingSettings) -> LogConfig {
    LogConfig {
        log_dir: settings.dir.as_deref().map(|dir| expand_home(Path::new(dir))),
        emit_stderr: settings.stderr,
        format: if settings.json {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        default_filter: settings.filter.clone(),
        ..LogConfig::default()
    }
}

pub fn driver_options(settings: &BrowserSettings) -> DriverOptions {
    DriverOptions {
        webdriver_url: settings.webdriver_url.clone(),
        headless: settings.headless,
        stealth: match settings.stealth {
            StealthLevel::Lightweight => StealthProfile::Lightweight,
            StealthLevel::Balanced => StealthProfile::Balanced,
            StealthLevel::Maximum => StealthProfile::Maximum,
        },
    }
}

/// Default provider for models that do not route to Gemini.
pub fn llm_config(settings: &LlmSettings, model: &str) -> LlmConfig {
    match &settings.default {
        LlmProvider::Openai {
            auth_token,
            endpoint,
        } => LlmConfig::OpenAi {
            api_key: if auth_token.is_empty() {
                std::env::var("OPENAI_API_KEY").unwrap_or_default()
            } else {
                auth_token.clone()
            },
            model: model.to_string(),
            base_url: Some(endpoint.clone()),
        },
        LlmProvider::Ollama { endpoint } => LlmConfig::Ollama {
            base_url: endpoint.clone(),
            model: model.to_string(),
        },
        LlmProvider::Gemini {
            auth_token,
            endpoint,
        } => LlmConfig::Gemini {
            api_key: auth_token.clone(),
            model: model.to_string(),
            base_url: Some(endpoint.clone()),
        },
    }
}

pub fn build_router(settings: &LlmSettings, model: &str) -> ModelRouter {
    ModelRouter::new(llm_config(settings, model)).with_gemini(
        settings.gemini_auth_token.clone(),
        Some(settings.gemini_endpoint.clone()),
    )
}
