//! Normalized absolute site URLs.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use url::Url;

use crate::CoreError;

/// A normalized absolute `http(s)` URL.
///
/// Input without a scheme is assumed to be `https`. The fragment is dropped
/// and a trailing slash is stripped from the comparison key, so
/// `example.com/about/` and `https://example.com/about` are the same page.
/// Equality and hashing use that key only.
#[derive(Clone)]
pub struct SiteUrl {
    url: Url,
    key: String,
}

impl SiteUrl {
    /// Parse and normalize user input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidUrl`] for empty input, non-HTTP schemes, or
    /// strings that do not parse to a URL with a host.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidUrl {
                input: raw.to_string(),
                reason: "empty URL".to_string(),
            });
        }

        let lower = trimmed.to_ascii_lowercase();
        let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.contains("://") {
            return Err(CoreError::InvalidUrl {
                input: raw.to_string(),
                reason: "only http and https URLs are supported".to_string(),
            });
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|e| CoreError::InvalidUrl {
            input: raw.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url).ok_or_else(|| CoreError::InvalidUrl {
            input: raw.to_string(),
            reason: "URL has no host".to_string(),
        })
    }

    /// Resolve `href` against this URL. Returns `None` for non-HTTP targets
    /// such as `mailto:`, `tel:` or `javascript:` links.
    #[must_use]
    pub fn join(&self, href: &str) -> Option<Self> {
        let href = href.trim().replace("&amp;", "&");
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let joined = self.url.join(&href).ok()?;
        Self::from_url(joined)
    }

    fn from_url(mut url: Url) -> Option<Self> {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }
        url.set_fragment(None);
        let key = url.as_str().trim_end_matches('/').to_string();
        Some(Self { url, key })
    }

    /// Normalized string form (no trailing slash).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The parsed URL as resolved, suitable for requests and joins.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scheme + host + port, e.g. `https://example.com`.
    #[must_use]
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    #[must_use]
    pub fn same_origin(&self, other: &SiteUrl) -> bool {
        self.url.origin() == other.url.origin()
    }
}

impl PartialEq for SiteUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SiteUrl {}

impl Hash for SiteUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl fmt::Debug for SiteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SiteUrl({})", self.key)
    }
}

impl Serialize for SiteUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_defaults_to_https() {
        let url = SiteUrl::parse("example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[test]
    fn keeps_explicit_http_scheme() {
        let url = SiteUrl::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080");
    }

    #[test]
    fn trailing_slash_does_not_change_identity() {
        let a = SiteUrl::parse("https://example.com/about/").unwrap();
        let b = SiteUrl::parse("https://example.com/about").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fragment_is_dropped() {
        let url = SiteUrl::parse("https://example.com/contact#form").unwrap();
        assert_eq!(url.as_str(), "https://example.com/contact");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            SiteUrl::parse("   "),
            Err(CoreError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(matches!(
            SiteUrl::parse("ftp://example.com"),
            Err(CoreError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(SiteUrl::parse("https://exa mple.com").is_err());
    }

    #[test]
    fn join_resolves_relative_paths() {
        let base = SiteUrl::parse("https://example.com/company/").unwrap();
        let joined = base.join("../contact-us").unwrap();
        assert_eq!(joined.as_str(), "https://example.com/contact-us");
    }

    #[test]
    fn join_skips_mailto_and_tel() {
        let base = SiteUrl::parse("https://example.com").unwrap();
        assert!(base.join("mailto:hi@example.com").is_none());
        assert!(base.join("tel:+15551234567").is_none());
        assert!(base.join("#top").is_none());
    }

    #[test]
    fn same_origin_compares_scheme_host_and_port() {
        let a = SiteUrl::parse("https://example.com/a").unwrap();
        let b = SiteUrl::parse("https://example.com/b").unwrap();
        let c = SiteUrl::parse("https://other.com/a").unwrap();
        assert!(a.same_origin(&b));
        assert!(!a.same_origin(&c));
    }
}
