//! Service names from list items under service-like headings.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::contacts::unique;
use crate::normalize::collapse_whitespace;

static SECTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, ul > li").expect("valid services selector")
});

static SERVICE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(services?|offer|offers|offerings?|solutions?|products?|what we do)\b")
        .expect("valid service heading regex")
});

/// Subtrees that never hold the service list.
const IGNORED_ANCESTORS: &[&str] = &["nav", "header", "footer", "script", "style"];

const MIN_WORDS: usize = 2;
const MAX_WORDS: usize = 12;

/// `<li>` texts of `<ul>` lists following a heading that mentions services,
/// up to the next heading that does not. Items outside 2 to 12 words are
/// dropped.
#[must_use]
pub fn extract_services(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut in_section = false;
    let mut items = Vec::new();

    for element in document.select(&SECTION_SELECTOR) {
        if inside_ignored(element) {
            continue;
        }
        let text = collapse_whitespace(&element.text().collect::<String>());
        if element.value().name() == "li" {
            let words = text.split_whitespace().count();
            if in_section && (MIN_WORDS..=MAX_WORDS).contains(&words) {
                items.push(text);
            }
        } else {
            in_section = SERVICE_HEADING_RE.is_match(&text);
        }
    }

    unique(items)
}

fn inside_ignored(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| IGNORED_ANCESTORS.contains(&el.name()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_items_under_service_heading() {
        let html = r"
            <h2>Our Services</h2>
            <ul>
              <li>Emergency pipe repair</li>
              <li>Water heater installation</li>
              <li>Drains</li>
              <li>Emergency pipe repair</li>
            </ul>
            <h2>Testimonials</h2>
            <ul><li>Great work, very fast</li></ul>";
        assert_eq!(
            extract_services(html),
            vec!["Emergency pipe repair", "Water heater installation"]
        );
    }

    #[test]
    fn ignores_navigation_lists() {
        let html = r"
            <nav><h3>Products</h3><ul><li>Product one here</li></ul></nav>
            <h2>What we do</h2>
            <ul><li>Commercial roof coating</li></ul>
            <footer><ul><li>Privacy policy link</li></ul></footer>";
        assert_eq!(extract_services(html), vec!["Commercial roof coating"]);
    }

    #[test]
    fn lists_without_heading_are_skipped() {
        let html = "<ul><li>Some list item</li></ul>";
        assert!(extract_services(html).is_empty());
    }

    #[test]
    fn overlong_items_are_dropped() {
        let html = "<h2>Solutions</h2><ul><li>one two three four five six seven eight nine ten eleven twelve thirteen</li><li>Cloud backup plans</li></ul>";
        assert_eq!(extract_services(html), vec!["Cloud backup plans"]);
    }
}
