//! Social profile links from anchors, Open Graph tags and JSON-LD `sameAs`.

use std::sync::LazyLock;

use bizprofile_core::{Platform, SocialLinks};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

static CANDIDATE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href], meta[property^="og:"], script[type="application/ld+json"]"#)
        .expect("valid social selector")
});

/// Path fragments of share/intent widgets, which point at the platform but
/// not at the business.
const SHARE_PATH_MARKERS: &[&str] = &["/sharer", "/share", "/intent/", "/dialog/"];

/// Collect social links from one page into `links`, keeping values already
/// present. Candidates are visited in document order.
pub fn collect_social_links(html: &str, links: &mut SocialLinks) {
    let document = Html::parse_document(html);
    for element in document.select(&CANDIDATE_SELECTOR) {
        for candidate in candidates(element) {
            if links.is_complete() {
                return;
            }
            if let Some(platform) = platform_of(&candidate) {
                links.fill(platform, &candidate);
            }
        }
    }
}

/// Social links across pages; earlier pages win.
#[must_use]
pub fn extract_social_links<'a>(pages: impl IntoIterator<Item = &'a str>) -> SocialLinks {
    let mut links = SocialLinks::default();
    for html in pages {
        collect_social_links(html, &mut links);
    }
    links
}

fn candidates(element: ElementRef<'_>) -> Vec<String> {
    let el = element.value();
    match el.name() {
        "a" => el.attr("href").map(|h| vec![h.trim().to_string()]).unwrap_or_default(),
        "meta" => el.attr("content").map(|c| vec![c.trim().to_string()]).unwrap_or_default(),
        "script" => {
            let raw: String = element.text().collect();
            serde_json::from_str::<Value>(raw.trim())
                .map(|value| {
                    let mut out = Vec::new();
                    collect_same_as(&value, &mut out);
                    out
                })
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

fn collect_same_as(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            match map.get("sameAs") {
                Some(Value::String(s)) => out.push(s.clone()),
                Some(Value::Array(items)) => {
                    out.extend(items.iter().filter_map(Value::as_str).map(String::from));
                }
                _ => {}
            }
            for (key, child) in map {
                if key != "sameAs" {
                    collect_same_as(child, out);
                }
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_same_as(child, out);
            }
        }
        _ => {}
    }
}

fn platform_of(candidate: &str) -> Option<Platform> {
    let lower = candidate.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("//") {
        format!("https:{lower}")
    } else {
        lower
    };
    let url = Url::parse(&with_scheme).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    if SHARE_PATH_MARKERS.iter().any(|m| url.path().starts_with(m)) {
        return None;
    }
    Platform::ALL.into_iter().find(|p| p.matches_host(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_matched_by_host() {
        let html = r#"
            <a href="https://www.facebook.com/acme">fb</a>
            <a href="https://dropbox.com/s/file">not x</a>
            <a href="https://x.com/acme">x</a>
            <a href="/contact">contact</a>"#;
        let links = extract_social_links([html]);
        assert_eq!(links.facebook, "https://www.facebook.com/acme");
        assert_eq!(links.twitter_x, "https://x.com/acme");
        assert!(links.instagram.is_empty());
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let html = r#"
            <meta property="og:see_also" content="https://instagram.com/first">
            <a href="https://instagram.com/second">ig</a>"#;
        let links = extract_social_links([html]);
        assert_eq!(links.instagram, "https://instagram.com/first");
    }

    #[test]
    fn reads_same_as_from_json_ld() {
        let html = r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Organization","name":"Acme",
             "sameAs":["https://www.linkedin.com/company/acme","https://twitter.com/acme"]}
        </script>"#;
        let links = extract_social_links([html]);
        assert_eq!(links.linkedin, "https://www.linkedin.com/company/acme");
        assert_eq!(links.twitter_x, "https://twitter.com/acme");
    }

    #[test]
    fn share_widgets_are_ignored() {
        let html = r#"
            <a href="https://www.facebook.com/sharer/sharer.php?u=https://acme.com">share</a>
            <a href="https://twitter.com/intent/tweet?url=x">tweet</a>
            <a href="https://facebook.com/acmeplumbing">page</a>"#;
        let links = extract_social_links([html]);
        assert_eq!(links.facebook, "https://facebook.com/acmeplumbing");
        assert!(links.twitter_x.is_empty());
    }

    #[test]
    fn earlier_pages_take_precedence() {
        let home = r#"<a href="https://facebook.com/home-page">fb</a>"#;
        let contact = r#"<a href="https://facebook.com/contact-page">fb</a><a href="https://instagram.com/acme">ig</a>"#;
        let links = extract_social_links([home, contact]);
        assert_eq!(links.facebook, "https://facebook.com/home-page");
        assert_eq!(links.instagram, "https://instagram.com/acme");
    }
}
