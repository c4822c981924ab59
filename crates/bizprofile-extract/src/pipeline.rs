//! End-to-end scrape: discovery, selection, fetch, extraction, merge.

use bizprofile_core::{AppConfig, BusinessProfile, SiteUrl};
use bizprofile_scraper::{home_first, select, Discovery, Fetcher};
use futures::future::join_all;

use crate::chunk::chunk_pages;
use crate::error::PipelineError;
use crate::fallback::{extract_fallback, PageContent};
use crate::merge::merge;
use crate::normalize::{dedupe_tokens, html_to_text};
use crate::rag::{RetrievalExtractor, RetrievalOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words carried over between consecutive chunks.
    pub chunk_overlap: usize,
    /// Collapse tokens repeated across pages before chunking. The fallback
    /// extractor always sees the un-deduplicated text.
    pub dedupe_tokens: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_size: 180,
            chunk_overlap: 30,
            dedupe_tokens: false,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            dedupe_tokens: config.dedupe_tokens,
        }
    }
}

pub struct ProfilePipeline {
    discovery: Discovery,
    fetcher: Fetcher,
    retrieval: Option<RetrievalExtractor>,
    options: PipelineOptions,
}

impl ProfilePipeline {
    #[must_use]
    pub fn new(discovery: Discovery, fetcher: Fetcher, options: PipelineOptions) -> Self {
        Self {
            discovery,
            fetcher,
            retrieval: None,
            options,
        }
    }

    /// Enable the retrieval path. Without it every profile comes from the
    /// fallback extractor alone.
    #[must_use]
    pub fn with_retrieval(mut self, retrieval: RetrievalExtractor) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    /// Scrape `raw_url` into a schema-complete profile.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidUrl`] if `raw_url` cannot be
    /// normalized. Every later failure degrades the result instead of
    /// erroring.
    pub async fn scrape(&self, raw_url: &str) -> Result<BusinessProfile, PipelineError> {
        let site = SiteUrl::parse(raw_url)?;
        Ok(self.scrape_site(&site).await)
    }

    pub async fn scrape_site(&self, site: &SiteUrl) -> BusinessProfile {
        let discovered = self.discovery.discover(site).await;
        let candidates = home_first(site, &discovered.urls);
        let selected = select(&candidates);
        tracing::info!(
            site = %site,
            method = ?discovered.method,
            discovered = discovered.urls.len(),
            selected = selected.len(),
            "pages selected"
        );

        let htmls = join_all(selected.iter().map(|page| self.fetcher.fetch_html(&page.url))).await;
        let pages: Vec<PageContent> = selected
            .into_iter()
            .zip(htmls)
            .map(|(page, html)| {
                let text = html_to_text(&html);
                tracing::debug!(url = %page.url, role = ?page.role, chars = text.len(), "page normalized");
                PageContent {
                    url: page.url,
                    html,
                    text,
                }
            })
            .collect();

        let texts: Vec<String> = pages.iter().map(|p| p.text.clone()).collect();
        let texts = if self.options.dedupe_tokens {
            dedupe_tokens(&texts)
        } else {
            texts
        };
        let chunk_input: Vec<(SiteUrl, String)> =
            pages.iter().map(|p| p.url.clone()).zip(texts).collect();
        let chunks = chunk_pages(&chunk_input, self.options.chunk_size, self.options.chunk_overlap);

        let outcome = match &self.retrieval {
            Some(retrieval) => retrieval.extract(&chunks, site).await,
            None => RetrievalOutcome::Unavailable,
        };
        let fallback = extract_fallback(&pages);

        let profile = merge(&outcome, fallback, site);
        tracing::info!(
            site = %site,
            chunks = chunks.len(),
            retrieval = outcome_label(&outcome),
            "profile assembled"
        );
        profile
    }
}

fn outcome_label(outcome: &RetrievalOutcome) -> &'static str {
    match outcome {
        RetrievalOutcome::Extracted(_) => "extracted",
        RetrievalOutcome::Malformed { .. } => "malformed",
        RetrievalOutcome::Unavailable => "unavailable",
    }
}
