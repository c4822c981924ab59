//! Candidate page discovery for a site.
//!
//! Strategies run in priority order and the first one that yields anything
//! wins: sitemaps, the external map service, a bounded breadth-first crawl,
//! and finally the base URL alone. Network failures inside a strategy are
//! logged and treated as "nothing found"; discovery itself never fails.

mod links;
mod sitemap;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use bizprofile_core::{AppConfig, SiteUrl};
use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::ScraperError;
use crate::firecrawl::SiteMapper;
use crate::http::{browser_like_client, get_ok_page, get_ok_text};

use links::same_origin_links;
use sitemap::parse_sitemap;

const SITEMAP_PATHS: [&str; 3] = ["/sitemap.xml", "/sitemap_index.xml", "/sitemap-index.xml"];

/// Child sitemaps fetched per index, to bound work on very large sites.
const MAX_CHILD_SITEMAPS: usize = 12;

/// Crawl pages fetched concurrently within one BFS level.
const CRAWL_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMethod {
    Sitemap,
    ExternalMap,
    Crawl,
    BaseOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub method: DiscoveryMethod,
    /// Never empty; order reflects discovery order.
    pub urls: Vec<SiteUrl>,
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub user_agent: String,
    /// Per-request timeout for sitemap and crawl fetches.
    pub timeout: Duration,
    /// Upper bound on pages visited by the crawl. Zero disables crawling.
    pub crawl_max_pages: usize,
}

impl DiscoveryConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.sitemap_timeout_secs),
            crawl_max_pages: config.crawl_max_pages,
        }
    }
}

pub struct Discovery {
    client: Client,
    mapper: Option<Arc<dyn SiteMapper>>,
    crawl_max_pages: usize,
}

impl Discovery {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            client: browser_like_client(config.timeout, &config.user_agent)?,
            mapper: None,
            crawl_max_pages: config.crawl_max_pages,
        })
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: Arc<dyn SiteMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub async fn discover(&self, base: &SiteUrl) -> Discovered {
        let found = self.from_sitemaps(base).await;
        if !found.is_empty() {
            return discovered(base, DiscoveryMethod::Sitemap, found);
        }

        let found = self.from_mapper(base).await;
        if !found.is_empty() {
            return discovered(base, DiscoveryMethod::ExternalMap, found);
        }

        let found = self.crawl(base).await;
        if !found.is_empty() {
            return discovered(base, DiscoveryMethod::Crawl, found);
        }

        discovered(base, DiscoveryMethod::BaseOnly, vec![base.clone()])
    }

    /// Union of page URLs across every reachable sitemap path, following
    /// index entries one level deep.
    async fn from_sitemaps(&self, base: &SiteUrl) -> Vec<SiteUrl> {
        let mut pages = UniqueUrls::default();
        let mut seen_sitemaps: HashSet<String> = HashSet::new();

        for path in SITEMAP_PATHS {
            let Some(sitemap_url) = base.join(path) else {
                continue;
            };
            let Some(entries) = self.fetch_sitemap(sitemap_url.as_str()).await else {
                continue;
            };
            seen_sitemaps.insert(sitemap_url.as_str().to_string());
            pages.extend_resolved(base, &entries.pages);

            for child in entries.sitemaps.iter().take(MAX_CHILD_SITEMAPS) {
                if !seen_sitemaps.insert(child.clone()) {
                    continue;
                }
                if let Some(child_entries) = self.fetch_sitemap(child).await {
                    pages.extend_resolved(base, &child_entries.pages);
                }
            }
        }

        pages.into_vec()
    }

    async fn fetch_sitemap(&self, url: &str) -> Option<sitemap::SitemapEntries> {
        let body = match get_ok_text(&self.client, url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url, error = %e, "sitemap not available");
                return None;
            }
        };
        match parse_sitemap(&body) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::debug!(url, error = %e, "sitemap did not parse");
                None
            }
        }
    }

    async fn from_mapper(&self, base: &SiteUrl) -> Vec<SiteUrl> {
        let Some(mapper) = &self.mapper else {
            return Vec::new();
        };
        match mapper.map(base.url().as_str()).await {
            Ok(links) => {
                let mut pages = UniqueUrls::default();
                pages.extend_resolved(base, &links);
                pages.into_vec()
            }
            Err(e) => {
                tracing::debug!(url = %base, error = %e, "site map service failed");
                Vec::new()
            }
        }
    }

    /// Breadth-first crawl from `base`, same-origin only.
    ///
    /// Every URL is visited at most once and at most `crawl_max_pages` pages
    /// are fetched. Pages within a level are fetched concurrently; the queue
    /// and visited set are only touched between fetches, by this task.
    ///
    /// Links resolve against the URL that actually served each page. When the
    /// base page itself redirects to another origin (apex to `www`, http to
    /// https), that origin is adopted as the site's.
    async fn crawl(&self, base: &SiteUrl) -> Vec<SiteUrl> {
        let mut queue: VecDeque<SiteUrl> = VecDeque::from([base.clone()]);
        let mut queued: HashSet<SiteUrl> = HashSet::from([base.clone()]);
        let mut visited: HashSet<SiteUrl> = HashSet::new();
        let mut site_origins: Vec<SiteUrl> = vec![base.clone()];
        let mut found = UniqueUrls::default();

        while !queue.is_empty() && visited.len() < self.crawl_max_pages {
            let budget = self.crawl_max_pages - visited.len();
            let level: Vec<SiteUrl> = queue.drain(..budget.min(queue.len())).collect();
            visited.extend(level.iter().cloned());

            let pages: Vec<Option<(SiteUrl, String)>> = stream::iter(level.iter())
                .map(|url| self.fetch_crawl_page(url))
                .buffered(CRAWL_CONCURRENCY)
                .collect()
                .await;

            for (url, page) in level.into_iter().zip(pages) {
                let Some((landed, html)) = page else {
                    continue;
                };
                let on_site = site_origins.iter().any(|origin| origin.same_origin(&landed));
                if !on_site {
                    if url != *base {
                        tracing::debug!(url = %url, landed = %landed, "crawl redirected off site");
                        continue;
                    }
                    tracing::debug!(url = %base, landed = %landed, "site redirects to another origin");
                    site_origins.push(landed.clone());
                }

                for link in same_origin_links(&html, &landed) {
                    if !visited.contains(&link) && queued.insert(link.clone()) {
                        queue.push_back(link);
                    }
                }
                if landed != url {
                    visited.insert(landed.clone());
                    queued.insert(landed.clone());
                }
                found.push(landed);
            }
        }

        let found = found.into_vec();
        tracing::debug!(url = %base, visited = visited.len(), found = found.len(), "crawl finished");
        found
    }

    async fn fetch_crawl_page(&self, url: &SiteUrl) -> Option<(SiteUrl, String)> {
        match get_ok_page(&self.client, url.url().as_str()).await {
            Ok((landed, body)) => {
                let landed = SiteUrl::parse(landed.as_str()).unwrap_or_else(|_| url.clone());
                Some((landed, body))
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "crawl fetch failed");
                None
            }
        }
    }
}

fn discovered(base: &SiteUrl, method: DiscoveryMethod, urls: Vec<SiteUrl>) -> Discovered {
    tracing::info!(url = %base, method = ?method, count = urls.len(), "discovery finished");
    Discovered { method, urls }
}

/// Order-preserving set of resolved URLs.
#[derive(Default)]
struct UniqueUrls {
    seen: HashSet<SiteUrl>,
    urls: Vec<SiteUrl>,
}

impl UniqueUrls {
    fn extend_resolved(&mut self, base: &SiteUrl, raw: &[String]) {
        for url in raw.iter().filter_map(|r| base.join(r)) {
            if self.seen.insert(url.clone()) {
                self.urls.push(url);
            }
        }
    }

    fn push(&mut self, url: SiteUrl) {
        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }

    fn into_vec(self) -> Vec<SiteUrl> {
        self.urls
    }
}
