//! HTML to plain text.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Node};

/// Elements whose text never reaches the output.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "header", "footer", "nav", "template", "svg",
];

/// Elements that start a new text block.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "section", "table", "td", "th",
    "title", "tr", "ul",
];

/// Visible text of `html` with page chrome removed and whitespace collapsed.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    collapse_whitespace(&raw_text(html))
}

/// Visible text split at block-level element boundaries, one entry per
/// non-empty block.
#[must_use]
pub fn html_to_blocks(html: &str) -> Vec<String> {
    raw_text(html)
        .split('\n')
        .map(collapse_whitespace)
        .filter(|block| !block.is_empty())
        .collect()
}

/// Text with a newline at every block boundary.
fn raw_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 2);
    collect_text(document.root_element(), &mut raw);
    raw
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Inline markup never separates words; only the text's own
            // whitespace and block boundaries do.
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(el) if el.name() == "br" => out.push(' '),
            Node::Element(el) => {
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop every whitespace-separated token already seen earlier in `texts`,
/// across all entries, keeping the first occurrence in place.
///
/// This strips boilerplate repeated on every page but also breaks sentences,
/// so it is opt-in.
#[must_use]
pub fn dedupe_tokens(texts: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    texts
        .iter()
        .map(|text| {
            text.split_whitespace()
                .filter(|token| seen.insert(*token))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
