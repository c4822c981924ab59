use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.fetch_timeout_secs, 20);
    assert_eq!(cfg.fetch_min_body_len, 200);
    assert_eq!(cfg.fetch_max_attempts, 3);
    assert_eq!(cfg.fetch_backoff_base_ms, 500);
    assert_eq!(cfg.sitemap_timeout_secs, 10);
    assert_eq!(cfg.crawl_max_pages, 25);
    assert_eq!(cfg.browser_max_sessions, 2);
    assert_eq!(cfg.browser_nav_timeout_secs, 45);
    assert!(cfg.browserless_url.is_none());
    assert!(cfg.firecrawl_api_key.is_none());
    assert_eq!(cfg.firecrawl_url, "https://api.firecrawl.dev/v2");
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.openai_url, "https://api.openai.com/v1");
    assert_eq!(cfg.chat_model, "gpt-4.1");
    assert_eq!(cfg.embedding_model, "text-embedding-3-large");
    assert!(cfg.tei_url.is_none());
    assert!(cfg.qdrant_url.is_none());
    assert_eq!(cfg.chunk_size, 180);
    assert_eq!(cfg.chunk_overlap, 30);
    assert_eq!(cfg.retrieval_top_k, 6);
    assert!(!cfg.dedupe_tokens);
    assert_eq!(cfg.scrape_timeout_secs, 120);
}

#[test]
fn blank_optional_values_are_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("FIRECRAWL_API_KEY", "   ");
    map.insert("OPENAI_API_KEY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.firecrawl_api_key.is_none());
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn optional_collaborators_are_read() {
    let mut map = HashMap::new();
    map.insert("BROWSERLESS_URL", "http://localhost:3000");
    map.insert("FIRECRAWL_API_KEY", "fc-key");
    map.insert("OPENAI_API_KEY", "sk-test");
    map.insert("BIZPROFILE_QDRANT_URL", "http://localhost:6333");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.browserless_url.as_deref(), Some("http://localhost:3000"));
    assert_eq!(cfg.firecrawl_api_key.as_deref(), Some("fc-key"));
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.qdrant_url.as_deref(), Some("http://localhost:6333"));
}

#[test]
fn chunk_size_override() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_CHUNK_SIZE", "400");
    map.insert("BIZPROFILE_CHUNK_OVERLAP", "50");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.chunk_size, 400);
    assert_eq!(cfg.chunk_overlap, 50);
}

#[test]
fn chunk_overlap_must_be_smaller_than_size() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_CHUNK_SIZE", "50");
    map.insert("BIZPROFILE_CHUNK_OVERLAP", "50");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROFILE_CHUNK_OVERLAP"),
        "expected InvalidEnvVar(BIZPROFILE_CHUNK_OVERLAP), got: {result:?}"
    );
}

#[test]
fn zero_chunk_size_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_CHUNK_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROFILE_CHUNK_SIZE"),
        "expected InvalidEnvVar(BIZPROFILE_CHUNK_SIZE), got: {result:?}"
    );
}

#[test]
fn fetch_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_FETCH_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROFILE_FETCH_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BIZPROFILE_FETCH_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn zero_fetch_attempts_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_FETCH_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROFILE_FETCH_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(BIZPROFILE_FETCH_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn zero_browser_sessions_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_BROWSER_MAX_SESSIONS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROFILE_BROWSER_MAX_SESSIONS"),
        "expected InvalidEnvVar(BIZPROFILE_BROWSER_MAX_SESSIONS), got: {result:?}"
    );
}

#[test]
fn dedupe_tokens_accepts_common_spellings() {
    for raw in ["1", "true", "TRUE", "yes"] {
        let mut map = HashMap::new();
        map.insert("BIZPROFILE_DEDUPE_TOKENS", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.dedupe_tokens, "expected true for {raw}");
    }
}

#[test]
fn dedupe_tokens_invalid() {
    let mut map = HashMap::new();
    map.insert("BIZPROFILE_DEDUPE_TOKENS", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROFILE_DEDUPE_TOKENS"),
        "expected InvalidEnvVar(BIZPROFILE_DEDUPE_TOKENS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-very-secret");
    map.insert("FIRECRAWL_API_KEY", "fc-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("sk-very-secret"));
    assert!(!debug.contains("fc-very-secret"));
    assert!(debug.contains("[redacted]"));
}
