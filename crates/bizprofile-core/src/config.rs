use crate::app_config::AppConfig;
use crate::ConfigError;

/// Desktop Chrome user agent used when `BIZPROFILE_USER_AGENT` is unset.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("BIZPROFILE_LOG_LEVEL", "info");
    let user_agent = or_default("BIZPROFILE_USER_AGENT", DEFAULT_USER_AGENT);

    let fetch_timeout_secs = parse_u64("BIZPROFILE_FETCH_TIMEOUT_SECS", "20")?;
    let fetch_min_body_len = parse_usize("BIZPROFILE_FETCH_MIN_BODY_LEN", "200")?;
    let fetch_max_attempts = parse_u32("BIZPROFILE_FETCH_MAX_ATTEMPTS", "3")?;
    if fetch_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZPROFILE_FETCH_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let fetch_backoff_base_ms = parse_u64("BIZPROFILE_FETCH_BACKOFF_BASE_MS", "500")?;
    let sitemap_timeout_secs = parse_u64("BIZPROFILE_SITEMAP_TIMEOUT_SECS", "10")?;
    let crawl_max_pages = parse_usize("BIZPROFILE_CRAWL_MAX_PAGES", "25")?;

    let browser_max_sessions = parse_usize("BIZPROFILE_BROWSER_MAX_SESSIONS", "2")?;
    if browser_max_sessions == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZPROFILE_BROWSER_MAX_SESSIONS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let browser_nav_timeout_secs = parse_u64("BIZPROFILE_BROWSER_NAV_TIMEOUT_SECS", "45")?;
    let browserless_url = optional("BROWSERLESS_URL");
    let browserless_token = optional("BROWSERLESS_TOKEN");

    let firecrawl_api_key = optional("FIRECRAWL_API_KEY");
    let firecrawl_url = or_default("BIZPROFILE_FIRECRAWL_URL", "https://api.firecrawl.dev/v2");

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_url = or_default("BIZPROFILE_OPENAI_URL", "https://api.openai.com/v1");
    let chat_model = or_default("BIZPROFILE_CHAT_MODEL", "gpt-4.1");
    let embedding_model = or_default("BIZPROFILE_EMBEDDING_MODEL", "text-embedding-3-large");
    let tei_url = optional("BIZPROFILE_TEI_URL");
    let qdrant_url = optional("BIZPROFILE_QDRANT_URL");

    let chunk_size = parse_usize("BIZPROFILE_CHUNK_SIZE", "180")?;
    if chunk_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZPROFILE_CHUNK_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let chunk_overlap = parse_usize("BIZPROFILE_CHUNK_OVERLAP", "30")?;
    if chunk_overlap >= chunk_size {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZPROFILE_CHUNK_OVERLAP".to_string(),
            reason: format!("overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"),
        });
    }
    let retrieval_top_k = parse_usize("BIZPROFILE_RETRIEVAL_TOP_K", "6")?;
    let dedupe_tokens = parse_bool(
        "BIZPROFILE_DEDUPE_TOKENS",
        &or_default("BIZPROFILE_DEDUPE_TOKENS", "false"),
    )?;
    let scrape_timeout_secs = parse_u64("BIZPROFILE_SCRAPE_TIMEOUT_SECS", "120")?;

    Ok(AppConfig {
        log_level,
        user_agent,
        fetch_timeout_secs,
        fetch_min_body_len,
        fetch_max_attempts,
        fetch_backoff_base_ms,
        sitemap_timeout_secs,
        crawl_max_pages,
        browser_max_sessions,
        browser_nav_timeout_secs,
        browserless_url,
        browserless_token,
        firecrawl_api_key,
        firecrawl_url,
        openai_api_key,
        openai_url,
        chat_model,
        embedding_model,
        tei_url,
        qdrant_url,
        chunk_size,
        chunk_overlap,
        retrieval_top_k,
        dedupe_tokens,
        scrape_timeout_secs,
    })
}

/// Parse a boolean flag. Accepts `1/0`, `true/false`, `yes/no` in any case.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
