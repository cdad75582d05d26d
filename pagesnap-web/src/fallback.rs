use pagesnap_drivers::PageHandle;
use scraper::{Html, Selector};

use crate::text::{char_len, css, stripped_text, truncate_chars};

/// Phrase older extractors emitted in place of a content region.
pub const MISSING_CONTENT_SENTINEL: &str = "Main content not found";

const MIN_CHARS: usize = 50;
const MAX_CHARS: usize = 2000;

/// Recovers some usable text from raw markup when a snapshot came back weak.
#[derive(Debug, Clone)]
pub struct FallbackContextBuilder {
    cascade: Vec<Selector>,
}

impl Default for FallbackContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackContextBuilder {
    pub fn new() -> Self {
        Self {
            cascade: vec![
                css("main"),
                css("article"),
                css("[role=\"main\"]"),
                css(".content"),
                css(".main-content"),
                css("[class*=\"content\"]"),
                css("body"),
            ],
        }
    }

    /// Whether a rendered snapshot is too weak to use on its own.
    pub fn needs_fallback(rendered: &str) -> bool {
        rendered.is_empty() || rendered.contains(MISSING_CONTENT_SENTINEL)
    }

    /// First element, in cascade order, with more than 50 chars of text,
    /// truncated to 2000 chars.
    pub fn recover_from_markup(&self, markup: &str) -> Option<String> {
        let doc = Html::parse_document(markup);
        self.cascade.iter().find_map(|selector| {
            doc.select(selector)
                .map(stripped_text)
                .find(|text| char_len(text) > MIN_CHARS)
                .map(|text| truncate_chars(&text, MAX_CHARS))
        })
    }

    /// Re-read the live markup and try [`Self::recover_from_markup`].
    ///
    /// Best effort: failures are logged and yield `None`.
    pub async fn recover(&self, page: &dyn PageHandle) -> Option<String> {
        let markup = match page.full_markup().await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::debug!(target: "snapshot.fallback", error = %e, "could not re-read markup");
                return None;
            }
        };

        let recovered = self.recover_from_markup(&markup);
        tracing::debug!(
            target: "snapshot.fallback",
            recovered = recovered.is_some(),
            "fallback cascade finished"
        );
        recovered
    }

    /// The context to hand to formatting: `rendered` unless it is weak and
    /// the page yields something better.
    pub async fn augment(&self, rendered: String, page: &dyn PageHandle) -> String {
        if !Self::needs_fallback(&rendered) {
            return rendered;
        }
        self.recover(page).await.unwrap_or(rendered)
    }
}
