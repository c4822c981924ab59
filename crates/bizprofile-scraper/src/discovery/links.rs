//! Anchor extraction for the crawl fallback.

use std::sync::LazyLock;

use bizprofile_core::SiteUrl;
use regex::Regex;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Extensions of resources that are never HTML pages.
const ASSET_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".pdf", ".zip", ".css", ".js",
    ".mp4", ".mp3", ".xml", ".json", ".woff", ".woff2",
];

/// Same-origin page links of `html`, resolved against `page`, in document
/// order. `mailto:`, `tel:` and other non-HTTP targets are dropped, as are
/// links to static assets.
pub(crate) fn same_origin_links(html: &str, page: &SiteUrl) -> Vec<SiteUrl> {
    HREF_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| page.join(m.as_str()))
        .filter(|link| link.same_origin(page))
        .filter(|link| !is_asset(link))
        .collect()
}

fn is_asset(url: &SiteUrl) -> bool {
    let path = url.url().path().to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
