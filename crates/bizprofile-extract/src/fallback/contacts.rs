//! Email, phone and street-address extraction from plain text.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\-\s()]{8,15}").expect("valid phone regex"));

static ADDRESS_CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,4}[,\s]+[A-Za-z0-9\s,.-]{20,200}").expect("valid address regex")
});

static ADDRESS_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(street|st|road|rd|avenue|ave|lane|ln|drive|dr|complex|building|floor|suite|office|near|opposite|highway|hwy|mall|square|circle|nagar|society)\b",
    )
    .expect("valid address keyword regex")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex"));

const MAX_ADDRESS_DIGIT_RATIO: f64 = 0.3;

#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    unique(EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string()))
}

#[must_use]
pub fn extract_phones(text: &str) -> Vec<String> {
    unique(PHONE_RE.find_iter(text).map(|m| m.as_str().trim().to_string()))
}

#[must_use]
pub fn extract_addresses(text: &str) -> Vec<String> {
    unique(
        ADDRESS_CANDIDATE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|candidate| is_plausible_address(candidate)),
    )
}

/// Accepts a candidate that names a street-like feature, carries no
/// four-digit year and is not mostly digits.
#[must_use]
pub fn is_plausible_address(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }
    if !ADDRESS_KEYWORD_RE.is_match(candidate) || YEAR_RE.is_match(candidate) {
        return false;
    }
    let total = candidate.chars().count();
    let digits = candidate.chars().filter(char::is_ascii_digit).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = digits as f64 / total as f64;
    ratio < MAX_ADDRESS_DIGIT_RATIO
}

/// Order-preserving de-duplication; drops empty strings.
pub(crate) fn unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
