/// Storage-safe collection name for a site.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, leading and trailing
/// non-alphanumerics are stripped, and the result is prefixed with
/// `collection_`. A site that sanitizes to nothing maps to `collection_default`.
#[must_use]
pub fn sanitize_collection_name(site_url: &str) -> String {
    let replaced: String = site_url
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    let name = if trimmed.is_empty() { "default" } else { trimmed };
    format!("collection_{name}")
}
