use std::collections::{BTreeMap, HashSet};

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::text::css;

const BLOCK_TAGS: [&str; 9] = ["h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol"];

fn is_block(el: ElementRef<'_>) -> bool {
    BLOCK_TAGS.contains(&el.value().name())
}

/// Secondary views over a document, minus structural noise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageStructure {
    pub paragraphs: Vec<String>,
    pub headings: Vec<String>,
    pub meta_data: BTreeMap<String, String>,
    pub internal_links: Vec<String>,
    pub formatted_content: String,
}

/// Walks a document and produces paragraphs, headings, metadata, same-host
/// links and the de-duplicated stream of leaf text blocks.
///
/// Works on its own copy of the tree with `aside`, `header`, `nav` and
/// `footer` detached; the caller's document is left untouched.
#[derive(Debug, Clone)]
pub struct StructuralExtractor {
    ignored_classes: HashSet<String>,
    noise: Selector,
    paragraph: Selector,
    heading: Selector,
    meta: Selector,
    anchor: Selector,
}

impl StructuralExtractor {
    pub fn new<I, S>(ignored_classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_classes: ignored_classes.into_iter().map(Into::into).collect(),
            noise: css("aside, header, nav, footer"),
            paragraph: css("p"),
            heading: css("h1, h2, h3, h4, h5, h6"),
            meta: css("meta"),
            anchor: css("a[href]"),
        }
    }

    pub fn extract(&self, doc: &Html, page_url: &str) -> PageStructure {
        let working = self.without_noise(doc);
        // detached nodes stay in the arena; only a walk from the root skips them
        let root = working.root_element();

        PageStructure {
            paragraphs: raw_texts(root, &self.paragraph),
            headings: raw_texts(root, &self.heading),
            meta_data: self.meta_data(root),
            internal_links: self.internal_links(root, page_url),
            formatted_content: self.formatted_content(root),
        }
    }

    fn without_noise(&self, doc: &Html) -> Html {
        let mut working = doc.clone();
        let noisy: Vec<_> = working.select(&self.noise).map(|el| el.id()).collect();
        for id in noisy {
            if let Some(mut node) = working.tree.get_mut(id) {
                node.detach();
            }
        }
        working
    }

    fn meta_data(&self, root: ElementRef<'_>) -> BTreeMap<String, String> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        let mut out = BTreeMap::new();
        for tag in root.select(&self.meta) {
            let attrs = tag.value();
            let key = present(attrs.attr("name")).or_else(|| present(attrs.attr("property")));
            if let (Some(key), Some(content)) = (key, present(attrs.attr("content"))) {
                out.insert(key.to_string(), content.to_string());
            }
        }
        out
    }

    fn internal_links(&self, root: ElementRef<'_>, page_url: &str) -> Vec<String> {
        let Ok(page) = Url::parse(page_url) else {
            return Vec::new();
        };
        let Some(host) = page.host_str() else {
            return Vec::new();
        };
        let origin = format!("{}://{host}", page.scheme());

        root.select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| {
                if href.starts_with('/') {
                    page.join(href).ok()
                } else if href.starts_with(&origin) {
                    Url::parse(href).ok()
                } else {
                    None
                }
            })
            // `//other.host/x` and `https://host.evil/` both pass the prefix tests
            .filter(|link| link.scheme() == page.scheme() && link.host_str() == Some(host))
            .map(String::from)
            .collect()
    }

    fn formatted_content(&self, root: ElementRef<'_>) -> String {
        let mut emitter = BlockEmitter::default();
        self.walk(root, &mut emitter);
        emitter.out
    }

    fn walk(&self, el: ElementRef<'_>, emitter: &mut BlockEmitter) {
        if el
            .value()
            .classes()
            .any(|class| self.ignored_classes.contains(class))
        {
            return;
        }

        if is_block(el) && !has_block_descendant(el) {
            emitter.push(&el.text().collect::<String>());
            return;
        }

        for child in el.children().filter_map(ElementRef::wrap) {
            self.walk(child, emitter);
        }
    }
}

fn has_block_descendant(el: ElementRef<'_>) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(is_block)
}

fn raw_texts(root: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    root.select(selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

/// Accumulates block text, never emitting a line twice (case-insensitively).
#[derive(Default)]
struct BlockEmitter {
    seen: HashSet<String>,
    out: String,
}

impl BlockEmitter {
    fn push(&mut self, raw: &str) {
        let text = raw.trim();
        if text.is_empty() {
            return;
        }

        if !text.contains('\n') {
            if self.seen.insert(text.to_lowercase()) {
                self.out.push_str(text);
                self.out.push_str(" \n");
            }
            return;
        }

        let fresh: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| self.seen.insert(line.to_lowercase()))
            .collect();
        if !fresh.is_empty() {
            self.out.push_str(&fresh.join("\n"));
            self.out.push_str(" \n");
        }
    }
}
