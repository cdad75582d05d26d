use scraper::{ElementRef, Selector};

/// Parse a selector that is a compile-time constant of this crate.
pub(crate) fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).expect("constant selector")
}

/// Every text node under `el`, trimmed, empties dropped, joined without a
/// separator.
pub(crate) fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max` Unicode scalar values of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn stripped_text_drops_whitespace_nodes() {
        let doc = Html::parse_fragment("<div>\n  <b> Hello </b>\n <i>world</i>  </div>");
        let div = doc.select(&css("div")).next().unwrap();
        assert_eq!(stripped_text(div), "Helloworld");
    }

    #[test]
    fn truncation_counts_scalar_values() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(char_len("日本語"), 3);
    }
}
