//! Reconciles the retrieval and fallback results into one profile.

use std::collections::HashSet;

use bizprofile_core::{BusinessProfile, PartialProfile, Platform, SiteUrl, SocialLinks};

use crate::rag::RetrievalOutcome;

/// Merge the two extraction paths field by field.
///
/// A non-empty retrieval value wins, otherwise the fallback value is used,
/// otherwise the field keeps its empty default. Social links merge per
/// platform. `url` is always the normalized input URL.
#[must_use]
pub fn merge(retrieval: &RetrievalOutcome, fallback: PartialProfile, site: &SiteUrl) -> BusinessProfile {
    let primary = retrieval.profile().cloned().unwrap_or_default();

    BusinessProfile {
        business_name: pick_text(primary.business_name, fallback.business_name),
        about_us: pick_text(primary.about_us, fallback.about_us),
        main_services: pick_list(primary.main_services, fallback.main_services),
        email: pick_list(primary.email, fallback.email),
        phone: pick_list(primary.phone, fallback.phone),
        address: pick_list(primary.address, fallback.address),
        social: merge_social(&primary.social, &fallback.social),
        description: pick_text(primary.description, fallback.description),
        url: site.as_str().to_string(),
    }
}

fn pick_text(primary: String, fallback: String) -> String {
    let primary = primary.trim();
    if primary.is_empty() {
        fallback.trim().to_string()
    } else {
        primary.to_string()
    }
}

fn pick_list(primary: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    let primary = clean_list(primary);
    if primary.is_empty() {
        clean_list(fallback)
    } else {
        primary
    }
}

/// Trim items, drop blanks, drop repeats (first occurrence wins).
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}

fn merge_social(primary: &SocialLinks, fallback: &SocialLinks) -> SocialLinks {
    let mut merged = SocialLinks::default();
    for platform in Platform::ALL {
        if !merged.fill(platform, primary.get(platform)) {
            merged.fill(platform, fallback.get(platform));
        }
    }
    merged
}
