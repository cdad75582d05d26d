use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::structure::PageStructure;

/// Title reported when the page never settled.
pub const TIMEOUT_TITLE: &str = "timeout waiting for page";

/// Structured extraction of one page-load attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub url: String,
    pub title: String,
    pub main_content: String,
    pub paragraphs: Vec<String>,
    pub headings: Vec<String>,
    pub meta_data: BTreeMap<String, String>,
    pub internal_links: Vec<String>,
    pub formatted_content: String,
}

impl Snapshot {
    pub fn new(url: String, title: String, main_content: String, structure: PageStructure) -> Self {
        Self {
            url,
            title,
            main_content,
            paragraphs: structure.paragraphs,
            headings: structure.headings,
            meta_data: structure.meta_data,
            internal_links: structure.internal_links,
            formatted_content: structure.formatted_content,
        }
    }

    /// Degraded snapshot for a page that never reached network idle.
    pub fn timed_out(url: String) -> Self {
        Self {
            url,
            title: TIMEOUT_TITLE.to_string(),
            ..Self::default()
        }
    }

    /// Readable text blob used as generation context.
    ///
    /// Sections with nothing to show are left out, so a snapshot with no
    /// title and no content renders as the empty string.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if !self.title.is_empty() {
            lines.push(format!("Title: {}", self.title));
        }

        let main = self.main_content.trim();
        if !main.is_empty() {
            lines.push("\nMain Content:".to_string());
            lines.push(main.to_string());
        }

        let formatted = self.formatted_content.trim();
        if !formatted.is_empty() {
            lines.push("\nFormatted Content:".to_string());
            lines.push(formatted.to_string());
        }

        let paragraphs: Vec<&str> = self
            .paragraphs
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            lines.push("\nParagraphs:".to_string());
            lines.extend(paragraphs.into_iter().map(String::from));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_orders_sections() {
        let snap = Snapshot {
            title: "Docs".into(),
            main_content: "  main body \n".into(),
            formatted_content: "Heading \nBody \n".into(),
            paragraphs: vec!["  first ".into(), "   ".into(), "second".into()],
            ..Snapshot::default()
        };

        assert_eq!(
            snap.render(),
            "Title: Docs\n\nMain Content:\nmain body\n\nFormatted Content:\nHeading \nBody\n\nParagraphs:\nfirst\nsecond"
        );
    }

    #[test]
    fn render_skips_empty_sections() {
        let snap = Snapshot {
            title: "Only title".into(),
            paragraphs: vec![" ".into()],
            ..Snapshot::default()
        };
        assert_eq!(snap.render(), "Title: Only title");
        assert_eq!(Snapshot::default().render(), "");
    }

    #[test]
    fn timed_out_snapshot_is_empty() {
        let snap = Snapshot::timed_out("about:blank".into());
        assert_eq!(snap.title, TIMEOUT_TITLE);
        assert_eq!(snap.url, "about:blank");
        assert!(snap.paragraphs.is_empty() && snap.internal_links.is_empty());
        assert!(snap.meta_data.is_empty() && snap.main_content.is_empty());
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let value = serde_json::to_value(Snapshot::default()).unwrap();
        for key in ["main_content", "meta_data", "internal_links", "formatted_content"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
