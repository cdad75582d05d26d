use scraper::{Html, Selector};

use crate::text::{char_len, css, stripped_text, truncate_chars};

/// Minimum length (exclusive) for the id/class/role probes and `<main>`/`<article>`.
const PRIMARY_MIN_CHARS: usize = 20;
/// Minimum length (exclusive) for the section scan.
const SCAN_MIN_CHARS: usize = 100;
const SCAN_MAX_CHARS: usize = 2000;

/// Locates the text of the most likely "main content" region of a document.
///
/// The cascade is an ordered table of probes; the first probe whose element
/// carries enough text wins. An empty result means "extraction weak", not an
/// error.
#[derive(Debug, Clone)]
pub struct ContentRegionSelector {
    probes: Vec<Selector>,
    main: Selector,
    article: Selector,
    scan: Selector,
}

impl Default for ContentRegionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRegionSelector {
    pub fn new() -> Self {
        Self {
            probes: vec![
                css("#main"),
                css("#content"),
                css(".main-content"),
                css(".main"),
                css("[role=\"main\"]"),
            ],
            main: css("main"),
            article: css("article"),
            scan: css("main, article, section"),
        }
    }

    pub fn select(&self, doc: &Html) -> String {
        // only the first element per probe is considered
        for probe in &self.probes {
            if let Some(text) = doc
                .select(probe)
                .next()
                .map(stripped_text)
                .filter(|t| char_len(t) > PRIMARY_MIN_CHARS)
            {
                return text;
            }
        }

        let landmark = doc
            .select(&self.main)
            .next()
            .or_else(|| doc.select(&self.article).next());
        if let Some(text) = landmark
            .map(stripped_text)
            .filter(|t| char_len(t) > PRIMARY_MIN_CHARS)
        {
            return text;
        }

        doc.select(&self.scan)
            .map(stripped_text)
            .find(|t| char_len(t) > SCAN_MIN_CHARS)
            .map(|t| truncate_chars(&t, SCAN_MAX_CHARS))
            .unwrap_or_default()
    }
}
