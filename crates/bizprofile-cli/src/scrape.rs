//! The `scrape` command: wire collaborators from config and run the pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bizprofile_core::{AppConfig, BusinessProfile};
use bizprofile_extract::{
    Embedder, MemoryVectorStore, OpenAiChat, OpenAiEmbedder, PipelineOptions, ProfilePipeline,
    QdrantStore, RetrievalExtractor, TeiEmbedder, VectorStore,
};
use bizprofile_scraper::{
    BrowserlessEngine, Discovery, DiscoveryConfig, Fetcher, FetcherConfig, FirecrawlClient,
};

/// Scrape `url` and print the profile on stdout.
///
/// # Errors
///
/// Returns an error if `url` is invalid, a client cannot be built, or the
/// scrape exceeds `scrape_timeout_secs`.
pub(crate) async fn run_scrape(config: &AppConfig, url: &str, pretty: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let limit = Duration::from_secs(config.scrape_timeout_secs);

    let profile = tokio::time::timeout(limit, pipeline.scrape(url))
        .await
        .map_err(|_| anyhow::anyhow!("scrape of {url} timed out after {limit:?}"))??;

    println!("{}", render_profile(&profile, pretty)?);
    Ok(())
}

pub(crate) fn render_profile(profile: &BusinessProfile, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(profile)
    } else {
        serde_json::to_string(profile)
    };
    json.context("failed to serialize profile")
}

/// Assemble the pipeline from whichever collaborators `config` enables.
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built.
pub(crate) fn build_pipeline(config: &AppConfig) -> anyhow::Result<ProfilePipeline> {
    let firecrawl = config
        .firecrawl_api_key
        .as_deref()
        .map(|key| FirecrawlClient::new(&config.firecrawl_url, key).map(Arc::new))
        .transpose()
        .context("failed to build Firecrawl client")?;

    let mut discovery = Discovery::new(&DiscoveryConfig::from_app_config(config))
        .context("failed to build discovery client")?;
    let mut fetcher = Fetcher::new(FetcherConfig::from_app_config(config))
        .context("failed to build fetcher")?;

    if let Some(firecrawl) = &firecrawl {
        discovery = discovery.with_mapper(firecrawl.clone());
        fetcher = fetcher.with_render_service(firecrawl.clone());
    }

    if let Some(browserless_url) = config.browserless_url.as_deref() {
        let engine = BrowserlessEngine::new(browserless_url, config.browserless_token.as_deref())
            .context("failed to build browser engine")?;
        fetcher = fetcher.with_browser(Arc::new(engine));
    } else {
        tracing::info!("BROWSERLESS_URL not set, browser tiers disabled");
    }

    let pipeline = ProfilePipeline::new(discovery, fetcher, PipelineOptions::from_app_config(config));
    Ok(match build_retrieval(config) {
        Some(retrieval) => pipeline.with_retrieval(retrieval),
        None => pipeline,
    })
}

/// The retrieval extractor needs a chat model; without `OPENAI_API_KEY`
/// profiles come from the fallback extractor only.
fn build_retrieval(config: &AppConfig) -> Option<RetrievalExtractor> {
    let Some(api_key) = config.openai_api_key.as_deref() else {
        tracing::warn!("OPENAI_API_KEY not set, retrieval extraction disabled");
        return None;
    };

    let embedder: Arc<dyn Embedder> = match config.tei_url.as_deref() {
        Some(tei_url) => Arc::new(TeiEmbedder::new(tei_url)),
        None => Arc::new(OpenAiEmbedder::new(
            &config.openai_url,
            api_key,
            &config.embedding_model,
        )),
    };
    let store: Arc<dyn VectorStore> = match config.qdrant_url.as_deref() {
        Some(qdrant_url) => Arc::new(QdrantStore::new(qdrant_url)),
        None => Arc::new(MemoryVectorStore::new()),
    };
    let chat = Arc::new(OpenAiChat::new(&config.openai_url, api_key, &config.chat_model));

    Some(RetrievalExtractor::new(
        embedder,
        store,
        chat,
        config.retrieval_top_k,
    ))
}
