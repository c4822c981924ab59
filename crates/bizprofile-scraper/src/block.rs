//! Anti-bot block page detection.

/// Phrases that mark an interstitial or denial page instead of real content.
const BLOCK_MARKERS: &[&str] = &[
    "access denied",
    "request could not be satisfied",
    "blocked",
    "/cdn-cgi/challenge-platform/",
    "attention required! | cloudflare",
];

/// Returns `true` when `html` looks like an anti-bot challenge or denial page.
///
/// Matching is case-insensitive substring search. The Cloudflare "Just a
/// moment..." interstitial only counts together with a cookie gate or a
/// `cf-chl-` token, since the phrase alone also appears in ordinary copy.
#[must_use]
pub fn looks_blocked(html: &str) -> bool {
    let lowered = html.to_ascii_lowercase();
    if BLOCK_MARKERS.iter().any(|m| lowered.contains(m)) {
        return true;
    }
    let has_just_a_moment = lowered.contains("just a moment...");
    has_just_a_moment
        && (lowered.contains("please enable cookies") || lowered.contains("cf-chl-"))
}
