//! Deterministic extraction that needs no external service.
//!
//! Every function here is pure and infallible: missing evidence yields empty
//! values, never an error.

pub(crate) mod contacts;
mod identity;
mod services;
mod social;

use bizprofile_core::{PartialProfile, SiteUrl};

use crate::normalize::html_to_blocks;

pub use contacts::{extract_addresses, extract_emails, extract_phones, is_plausible_address};
pub use services::extract_services;
pub use social::{collect_social_links, extract_social_links};

use contacts::unique;
use identity::extract_identity;

/// A fetched page in both raw and normalized form.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: SiteUrl,
    pub html: String,
    pub text: String,
}

/// Heuristic profile over `pages`, which are in selection order (home first).
///
/// Emails and phones are matched over the joined page text. Addresses are
/// matched per text block so a candidate never runs into a neighbouring
/// element.
#[must_use]
pub fn extract_fallback(pages: &[PageContent]) -> PartialProfile {
    let text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let identity = pages
        .first()
        .map(|home| extract_identity(&home.html))
        .unwrap_or_default();

    PartialProfile {
        business_name: identity.name,
        about_us: String::new(),
        main_services: unique(pages.iter().flat_map(|p| extract_services(&p.html))),
        email: extract_emails(&text),
        phone: extract_phones(&text),
        address: unique(
            pages
                .iter()
                .flat_map(|p| html_to_blocks(&p.html))
                .flat_map(|block| extract_addresses(&block)),
        ),
        social: extract_social_links(pages.iter().map(|p| p.html.as_str())),
        description: identity.description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::html_to_text;

    fn page(url: &str, html: &str) -> PageContent {
        PageContent {
            url: SiteUrl::parse(url).unwrap(),
            html: html.to_string(),
            text: html_to_text(html),
        }
    }

    #[test]
    fn combines_every_heuristic() {
        let home = page(
            "https://acme.com",
            r#"<html><head><title>Acme Plumbing</title>
               <meta name="description" content="Family plumbers since forever."></head>
               <body><h2>Services</h2><ul><li>Leak detection and repair</li></ul>
               <a href="https://facebook.com/acme">Facebook</a></body></html>"#,
        );
        let contact = page(
            "https://acme.com/contact",
            r"<html><body><p>Email info@acme.com or call +1 555 123 4567.</p>
               <p>Find us at 42 Harbor Road, Springfield Industrial Park</p></body></html>",
        );

        let profile = extract_fallback(&[home, contact]);

        assert_eq!(profile.business_name, "Acme Plumbing");
        assert_eq!(profile.description, "Family plumbers since forever.");
        assert_eq!(profile.main_services, vec!["Leak detection and repair"]);
        assert_eq!(profile.email, vec!["info@acme.com"]);
        assert_eq!(profile.phone, vec!["+1 555 123 4567"]);
        assert_eq!(profile.address, vec!["42 Harbor Road, Springfield Industrial Park"]);
        assert_eq!(profile.social.facebook, "https://facebook.com/acme");
        assert!(profile.about_us.is_empty());
    }

    #[test]
    fn no_pages_gives_empty_profile() {
        assert_eq!(extract_fallback(&[]), PartialProfile::default());
    }
}
