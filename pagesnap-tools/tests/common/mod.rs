use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pagesnap_common::{PagesnapError, Result};
use pagesnap_config::PagesnapConfig;
use pagesnap_drivers::{PageError, PageHandle};
use pagesnap_llm::{CompletionBackend, CompletionRequest};
use pagesnap_tools::ToolContext;

/// A page that is always idle and serves fixed markup.
pub struct StaticPage {
    pub url: String,
    pub title: String,
    pub markup: String,
}

impl StaticPage {
    pub fn new(url: &str, title: &str, markup: &str) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            markup: markup.into(),
        }
    }
}

#[async_trait]
impl PageHandle for StaticPage {
    async fn wait_for_network_idle(&self, _timeout: Duration) -> std::result::Result<(), PageError> {
        Ok(())
    }

    async fn current_url(&self) -> std::result::Result<String, PageError> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> std::result::Result<String, PageError> {
        Ok(self.title.clone())
    }

    async fn full_markup(&self) -> std::result::Result<String, PageError> {
        Ok(self.markup.clone())
    }
}

/// Backend returning a fixed reply and recording every request.
pub struct ScriptedBackend {
    reply: std::result::Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(PagesnapError::Agent)
    }
}

pub fn context(page: StaticPage, backend: Arc<ScriptedBackend>) -> ToolContext {
    ToolContext::new(Box::new(page), backend, &PagesnapConfig::default())
}
