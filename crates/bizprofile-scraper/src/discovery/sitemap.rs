//! Sitemap and sitemap-index parsing.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ScraperError;

/// `<loc>` entries of one sitemap document, split by kind.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SitemapEntries {
    /// Page URLs from `<url><loc>` (or bare `<loc>`) entries.
    pub pages: Vec<String>,
    /// Child sitemap URLs from `<sitemap><loc>` entries of an index.
    pub sitemaps: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parent {
    None,
    Url,
    Sitemap,
}

/// Parse a `urlset` or `sitemapindex` document.
///
/// Namespace prefixes are ignored. Empty `<loc>` values are skipped.
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] if the document is not well-formed XML.
pub(crate) fn parse_sitemap(xml: &str) -> Result<SitemapEntries, ScraperError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = SitemapEntries::default();
    let mut parent = Parent::None;
    let mut in_loc = false;
    let mut loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => parent = Parent::Url,
                b"sitemap" => parent = Parent::Sitemap,
                b"loc" => {
                    in_loc = true;
                    loc.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_loc {
                    loc.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if in_loc {
                    loc.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => {
                    in_loc = false;
                    let value = loc.trim();
                    if !value.is_empty() {
                        match parent {
                            Parent::Sitemap => entries.sitemaps.push(value.to_string()),
                            Parent::Url | Parent::None => entries.pages.push(value.to_string()),
                        }
                    }
                }
                b"url" | b"sitemap" => parent = Parent::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ScraperError::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://example.com/about </loc></url>
  <url><loc>https://example.com/a?x=1&amp;y=2</loc></url>
</urlset>"#;
        let entries = parse_sitemap(xml).unwrap();
        assert_eq!(
            entries.pages,
            vec![
                "https://example.com/",
                "https://example.com/about",
                "https://example.com/a?x=1&y=2"
            ]
        );
        assert!(entries.sitemaps.is_empty());
    }

    #[test]
    fn parses_sitemap_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/page-sitemap.xml</loc></sitemap>
  <sitemap><loc><![CDATA[https://example.com/post-sitemap.xml]]></loc></sitemap>
</sitemapindex>"#;
        let entries = parse_sitemap(xml).unwrap();
        assert!(entries.pages.is_empty());
        assert_eq!(
            entries.sitemaps,
            vec![
                "https://example.com/page-sitemap.xml",
                "https://example.com/post-sitemap.xml"
            ]
        );
    }

    #[test]
    fn ignores_namespace_prefixes() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://example.com/services</sm:loc></sm:url>
</sm:urlset>"#;
        let entries = parse_sitemap(xml).unwrap();
        assert_eq!(entries.pages, vec!["https://example.com/services"]);
    }

    #[test]
    fn html_soft_404_yields_nothing() {
        let html = "<html><body><p>Not found</p></body></html>";
        let entries = parse_sitemap(html).unwrap();
        assert_eq!(entries, SitemapEntries::default());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_sitemap("<urlset><url><loc>x</url></urlset>").is_err());
    }
}
