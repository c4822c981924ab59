/// Runtime configuration for a scrape pipeline and its collaborators.
///
/// Optional collaborators (browser, Firecrawl, `OpenAI`, TEI, Qdrant) are
/// `None` when their env vars are absent; the pipeline degrades instead of
/// failing.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub fetch_min_body_len: usize,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_base_ms: u64,
    pub sitemap_timeout_secs: u64,
    pub crawl_max_pages: usize,
    pub browser_max_sessions: usize,
    pub browser_nav_timeout_secs: u64,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub firecrawl_api_key: Option<String>,
    pub firecrawl_url: String,
    pub openai_api_key: Option<String>,
    pub openai_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub tei_url: Option<String>,
    pub qdrant_url: Option<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_top_k: usize,
    pub dedupe_tokens: bool,
    pub scrape_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_min_body_len", &self.fetch_min_body_len)
            .field("fetch_max_attempts", &self.fetch_max_attempts)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("sitemap_timeout_secs", &self.sitemap_timeout_secs)
            .field("crawl_max_pages", &self.crawl_max_pages)
            .field("browser_max_sessions", &self.browser_max_sessions)
            .field("browser_nav_timeout_secs", &self.browser_nav_timeout_secs)
            .field("browserless_url", &self.browserless_url)
            .field(
                "browserless_token",
                &self.browserless_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "firecrawl_api_key",
                &self.firecrawl_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("firecrawl_url", &self.firecrawl_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_url", &self.openai_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("tei_url", &self.tei_url)
            .field("qdrant_url", &self.qdrant_url)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("retrieval_top_k", &self.retrieval_top_k)
            .field("dedupe_tokens", &self.dedupe_tokens)
            .field("scrape_timeout_secs", &self.scrape_timeout_secs)
            .finish()
    }
}
