//! The business profile record and its partial producer form.

use serde::{Deserialize, Serialize};

/// Social platforms tracked on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Facebook,
    Instagram,
    LinkedIn,
    TwitterX,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::LinkedIn,
        Platform::TwitterX,
    ];

    /// Registrable domains that identify the platform.
    #[must_use]
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            Platform::Facebook => &["facebook.com", "fb.com"],
            Platform::Instagram => &["instagram.com"],
            Platform::LinkedIn => &["linkedin.com"],
            Platform::TwitterX => &["twitter.com", "x.com"],
        }
    }

    /// Whether `host` is one of the platform's domains or a subdomain of one.
    #[must_use]
    pub fn matches_host(self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains()
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }
}

/// One profile URL per platform; empty string when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialLinks {
    pub facebook: String,
    pub instagram: String,
    pub linkedin: String,
    pub twitter_x: String,
}

impl SocialLinks {
    #[must_use]
    pub fn get(&self, platform: Platform) -> &str {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Instagram => &self.instagram,
            Platform::LinkedIn => &self.linkedin,
            Platform::TwitterX => &self.twitter_x,
        }
    }

    fn slot(&mut self, platform: Platform) -> &mut String {
        match platform {
            Platform::Facebook => &mut self.facebook,
            Platform::Instagram => &mut self.instagram,
            Platform::LinkedIn => &mut self.linkedin,
            Platform::TwitterX => &mut self.twitter_x,
        }
    }

    /// Store `url` for `platform` unless a value is already present.
    /// Returns `true` when the slot was filled.
    pub fn fill(&mut self, platform: Platform, url: &str) -> bool {
        let url = url.trim();
        let slot = self.slot(platform);
        if !slot.is_empty() || url.is_empty() {
            return false;
        }
        *slot = url.to_string();
        true
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        Platform::ALL.iter().all(|p| !self.get(*p).is_empty())
    }
}

/// Output of one extraction path (retrieval or fallback) before merging.
///
/// Every field uses its empty value to mean "no evidence".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialProfile {
    pub business_name: String,
    pub about_us: String,
    pub main_services: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub address: Vec<String>,
    pub social: SocialLinks,
    pub description: String,
}

/// The canonical scrape result.
///
/// Every field is always present with a type-correct value; empty strings and
/// empty lists stand for "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessProfile {
    pub business_name: String,
    pub about_us: String,
    pub main_services: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub address: Vec<String>,
    #[serde(flatten)]
    pub social: SocialLinks,
    pub description: String,
    pub url: String,
}

impl BusinessProfile {
    /// An all-defaults profile stamped with `url`.
    #[must_use]
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_serializes_every_field() {
        let profile = BusinessProfile::empty("https://example.com");
        let value = serde_json::to_value(&profile).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "businessName",
            "aboutUs",
            "mainServices",
            "email",
            "phone",
            "address",
            "facebook",
            "instagram",
            "linkedin",
            "twitterX",
            "description",
            "url",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.len(), 12);
        assert_eq!(obj["mainServices"], serde_json::json!([]));
        assert_eq!(obj["twitterX"], serde_json::json!(""));
        assert_eq!(obj["url"], serde_json::json!("https://example.com"));
    }

    #[test]
    fn deserializes_with_missing_fields_as_defaults() {
        let profile: BusinessProfile =
            serde_json::from_str(r#"{"businessName":"Acme","facebook":"https://facebook.com/acme"}"#)
                .unwrap();
        assert_eq!(profile.business_name, "Acme");
        assert_eq!(profile.social.facebook, "https://facebook.com/acme");
        assert!(profile.email.is_empty());
    }

    #[test]
    fn fill_keeps_first_value() {
        let mut links = SocialLinks::default();
        assert!(links.fill(Platform::Facebook, "https://facebook.com/first"));
        assert!(!links.fill(Platform::Facebook, "https://facebook.com/second"));
        assert_eq!(links.facebook, "https://facebook.com/first");
    }

    #[test]
    fn platform_host_matching_is_exact_on_domain() {
        assert!(Platform::TwitterX.matches_host("x.com"));
        assert!(Platform::TwitterX.matches_host("www.twitter.com"));
        assert!(!Platform::TwitterX.matches_host("dropbox.com"));
        assert!(Platform::LinkedIn.matches_host("in.linkedin.com"));
        assert!(!Platform::Facebook.matches_host("notfacebook.com"));
    }
}
