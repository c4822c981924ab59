//! Business name and description from page metadata.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use crate::normalize::collapse_whitespace;

static SITE_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:site_name"]"#).expect("valid site name selector")
});
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid title selector"));
static DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#)
        .expect("valid description selector")
});
static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid json-ld selector")
});

/// Separators between the page name and the site name in `<title>`.
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " \u{2013} ", " \u{2014} ", " :: "];

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Identity {
    pub name: String,
    pub description: String,
}

/// Name: `og:site_name`, then a JSON-LD organization name, then the last
/// `<title>` segment. Description: the meta description.
pub(crate) fn extract_identity(html: &str) -> Identity {
    let document = Html::parse_document(html);

    let site_name = document
        .select(&SITE_NAME_SELECTOR)
        .find_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty());

    let name = site_name
        .or_else(|| {
            document
                .select(&JSON_LD_SELECTOR)
                .filter_map(|el| serde_json::from_str::<Value>(el.text().collect::<String>().trim()).ok())
                .find_map(|value| organization_name(&value))
        })
        .or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .map(|el| title_site_name(&el.text().collect::<String>()))
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_default();

    let description = document
        .select(&DESCRIPTION_SELECTOR)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    Identity { name, description }
}

fn organization_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            let is_org = map.get("@type").is_some_and(|t| match t {
                Value::String(s) => is_organization_type(s),
                Value::Array(types) => types.iter().filter_map(Value::as_str).any(is_organization_type),
                _ => false,
            });
            if is_org {
                if let Some(name) = map.get("name").and_then(Value::as_str) {
                    let name = collapse_whitespace(name);
                    if !name.is_empty() {
                        return Some(name);
                    }
                }
            }
            map.values().find_map(organization_name)
        }
        Value::Array(items) => items.iter().find_map(organization_name),
        _ => None,
    }
}

fn is_organization_type(kind: &str) -> bool {
    let lower = kind.to_ascii_lowercase();
    lower.contains("organization") || lower.contains("business") || lower == "corporation"
}

/// `"Contact Us | Acme Plumbing"` → `"Acme Plumbing"`.
fn title_site_name(title: &str) -> String {
    let title = collapse_whitespace(title);
    TITLE_SEPARATORS
        .iter()
        .find_map(|sep| title.rsplit_once(sep).map(|(_, tail)| tail.trim().to_string()))
        .unwrap_or(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_og_site_name() {
        let html = r#"<head><title>Home | Something Else</title>
            <meta property="og:site_name" content="Acme Plumbing">
            <meta name="description" content="  Plumbing   for the whole city. "></head>"#;
        assert_eq!(
            extract_identity(html),
            Identity {
                name: "Acme Plumbing".to_string(),
                description: "Plumbing for the whole city.".to_string(),
            }
        );
    }

    #[test]
    fn falls_back_to_json_ld_organization() {
        let html = r#"<script type="application/ld+json">
            {"@graph":[{"@type":"WebPage","name":"Home"},{"@type":"LocalBusiness","name":"Acme Roofing"}]}
            </script><title>Welcome</title>"#;
        assert_eq!(extract_identity(html).name, "Acme Roofing");
    }

    #[test]
    fn uses_last_title_segment() {
        let html = "<title>Contact Us | Acme Dental</title>";
        assert_eq!(extract_identity(html).name, "Acme Dental");
        let html = "<title>Acme Dental</title>";
        assert_eq!(extract_identity(html).name, "Acme Dental");
    }

    #[test]
    fn empty_page_has_empty_identity() {
        assert_eq!(extract_identity(""), Identity::default());
    }
}
