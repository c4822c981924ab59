//! Tiered page fetcher.
//!
//! Tiers are tried in order within one attempt:
//!
//! 1. [`Tier::FastHttp`]: plain GET; accepted on status 200 with a body
//!    longer than the configured minimum.
//! 2. [`Tier::Headless`]: headless browser render, when an engine is
//!    configured. A block page here escalates once to [`Tier::Headful`] after
//!    a randomized pause, and whatever that produces ends the fetch.
//! 3. [`Tier::ExternalRender`]: remote render service, only when no browser
//!    engine is configured. Any HTML it returns is accepted, even empty.
//!
//! A failed attempt backs off with jitter and the chain runs again, up to the
//! attempt budget. After that the longest HTML seen is returned. The fetcher
//! never fails; total failure yields empty HTML.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use bizprofile_core::{AppConfig, SiteUrl};
use reqwest::Client;
use tokio::sync::Semaphore;

use crate::backoff::{jittered_delay, pause, random_between};
use crate::block::looks_blocked;
use crate::browser::{BrowserEngine, BrowserSession, LaunchOptions, NavigateOptions, STEALTH_SCRIPT};
use crate::error::ScraperError;
use crate::firecrawl::RenderService;
use crate::http::{browser_like_client, get_text};

/// Randomized wait after navigation for client-side rendering.
const SETTLE_MS: RangeInclusive<u64> = 500..=2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    FastHttp,
    Headless,
    Headful,
    ExternalRender,
}

impl Tier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::FastHttp => "fast-http",
            Tier::Headless => "headless",
            Tier::Headful => "headful",
            Tier::ExternalRender => "external-render",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub html: String,
    pub tier_used: Tier,
    pub blocked: bool,
}

impl FetchResult {
    fn empty() -> Self {
        Self {
            html: String::new(),
            tier_used: Tier::FastHttp,
            blocked: false,
        }
    }
}

/// Outcome of running a single tier once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierAttempt {
    pub success: bool,
    pub html: String,
    pub blocked: bool,
}

impl TierAttempt {
    fn failed(html: String) -> Self {
        Self {
            success: false,
            blocked: looks_blocked(&html),
            html,
        }
    }

    fn rendered(html: String) -> Self {
        Self {
            success: true,
            blocked: looks_blocked(&html),
            html,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    /// Timeout for the fast-http tier.
    pub timeout: Duration,
    pub min_body_len: usize,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub nav_timeout: Duration,
    /// Permits for the browser-session semaphore.
    pub max_browser_sessions: usize,
}

impl FetcherConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            min_body_len: config.fetch_min_body_len,
            max_attempts: config.fetch_max_attempts,
            backoff_base_ms: config.fetch_backoff_base_ms,
            nav_timeout: Duration::from_secs(config.browser_nav_timeout_secs),
            max_browser_sessions: config.browser_max_sessions,
        }
    }
}

pub struct Fetcher {
    config: FetcherConfig,
    client: Client,
    browser: Option<Arc<dyn BrowserEngine>>,
    render: Option<Arc<dyn RenderService>>,
    sessions: Arc<Semaphore>,
}

impl Fetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: FetcherConfig) -> Result<Self, ScraperError> {
        let client = browser_like_client(config.timeout, &config.user_agent)?;
        let sessions = Arc::new(Semaphore::new(config.max_browser_sessions.max(1)));
        Ok(Self {
            config,
            client,
            browser: None,
            render: None,
            sessions,
        })
    }

    /// Enable the headless and headful tiers.
    #[must_use]
    pub fn with_browser(mut self, engine: Arc<dyn BrowserEngine>) -> Self {
        self.browser = Some(engine);
        self
    }

    /// Enable the external render tier (used only without a browser engine).
    #[must_use]
    pub fn with_render_service(mut self, render: Arc<dyn RenderService>) -> Self {
        self.render = Some(render);
        self
    }

    /// Share one browser-session semaphore between several fetchers.
    #[must_use]
    pub fn with_session_limit(mut self, sessions: Arc<Semaphore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Fetch `url`, returning only the HTML.
    pub async fn fetch_html(&self, url: &SiteUrl) -> String {
        self.fetch(url).await.html
    }

    /// Fetch `url` through the tier chain within the attempt budget.
    pub async fn fetch(&self, url: &SiteUrl) -> FetchResult {
        let mut best = FetchResult::empty();
        for attempt in 0..self.config.max_attempts {
            if attempt > 0 {
                let delay = jittered_delay(self.config.backoff_base_ms, attempt - 1);
                tracing::debug!(url = %url, attempt, delay = ?delay, "retrying fetch after backoff");
                pause(delay).await;
            }
            if let Some(result) = self.run_chain(url, &mut best).await {
                tracing::debug!(
                    url = %url,
                    tier = result.tier_used.as_str(),
                    blocked = result.blocked,
                    bytes = result.html.len(),
                    "page fetched"
                );
                return result;
            }
        }
        tracing::warn!(
            url = %url,
            attempts = self.config.max_attempts,
            bytes = best.html.len(),
            "fetch budget exhausted, returning best html seen"
        );
        best
    }

    /// The ordered tiers for one attempt, not counting the headful escalation.
    fn chain(&self) -> Vec<Tier> {
        let mut tiers = vec![Tier::FastHttp];
        if self.browser.is_some() {
            tiers.push(Tier::Headless);
        } else if self.render.is_some() {
            tiers.push(Tier::ExternalRender);
        }
        tiers
    }

    async fn run_chain(&self, url: &SiteUrl, best: &mut FetchResult) -> Option<FetchResult> {
        for tier in self.chain() {
            let attempt = self.attempt(tier, url).await;

            if tier == Tier::Headless && attempt.success && attempt.blocked {
                return Some(self.escalate(url, attempt).await);
            }
            if attempt.success {
                return Some(FetchResult {
                    html: attempt.html,
                    tier_used: tier,
                    blocked: attempt.blocked,
                });
            }
            if attempt.html.len() > best.html.len() {
                *best = FetchResult {
                    html: attempt.html,
                    tier_used: tier,
                    blocked: attempt.blocked,
                };
            }
        }
        None
    }

    /// One headful retry after a blocked headless render. Its HTML is final.
    async fn escalate(&self, url: &SiteUrl, headless: TierAttempt) -> FetchResult {
        let base = self.config.backoff_base_ms;
        let delay = random_between(&(base..=base.saturating_mul(4)));
        tracing::warn!(url = %url, delay = ?delay, "headless render blocked, escalating to headful");
        pause(delay).await;

        let headful = self.attempt(Tier::Headful, url).await;
        if headful.html.is_empty() {
            return FetchResult {
                html: headless.html,
                tier_used: Tier::Headless,
                blocked: true,
            };
        }
        FetchResult {
            html: headful.html,
            tier_used: Tier::Headful,
            blocked: headful.blocked,
        }
    }

    /// Run a single tier once. Failures are logged and reported in the
    /// returned [`TierAttempt`], never raised.
    pub async fn attempt(&self, tier: Tier, url: &SiteUrl) -> TierAttempt {
        let outcome = match tier {
            Tier::FastHttp => self.fast_http(url).await,
            Tier::Headless => self.browse(url, true).await.map(TierAttempt::rendered),
            Tier::Headful => self.browse(url, false).await.map(TierAttempt::rendered),
            Tier::ExternalRender => self.external_render(url).await,
        };
        outcome.unwrap_or_else(|e| {
            tracing::debug!(url = %url, tier = tier.as_str(), error = %e, "fetch tier failed");
            TierAttempt::default()
        })
    }

    async fn fast_http(&self, url: &SiteUrl) -> Result<TierAttempt, ScraperError> {
        let (status, body) = get_text(&self.client, url.url().as_str()).await?;
        if status == 200 && body.len() > self.config.min_body_len {
            return Ok(TierAttempt {
                success: true,
                blocked: looks_blocked(&body),
                html: body,
            });
        }
        tracing::debug!(url = %url, status, bytes = body.len(), "fast-http response rejected");
        Ok(TierAttempt::failed(body))
    }

    async fn external_render(&self, url: &SiteUrl) -> Result<TierAttempt, ScraperError> {
        let Some(render) = &self.render else {
            return Ok(TierAttempt::default());
        };
        let html = render.render(url.url().as_str()).await?;
        Ok(TierAttempt::rendered(html))
    }

    async fn browse(&self, url: &SiteUrl, headless: bool) -> Result<String, ScraperError> {
        let Some(engine) = &self.browser else {
            return Err(ScraperError::Browser("no browser engine configured".to_string()));
        };
        // Held until the session is closed.
        let _permit = self.sessions.acquire().await.map_err(|_| ScraperError::PoolClosed)?;

        let launch = LaunchOptions {
            headless,
            user_agent: self.config.user_agent.clone(),
            stealth_script: Some(STEALTH_SCRIPT.to_string()),
        };
        let navigate = NavigateOptions {
            timeout: self.config.nav_timeout,
            settle: random_between(&SETTLE_MS),
            scroll: true,
        };

        let mut session = engine.launch(&launch).await?;
        let rendered = render_in(session.as_mut(), url.url().as_str(), &navigate).await;
        session.close().await;
        let html = rendered?;
        if html.trim().is_empty() {
            return Err(ScraperError::ThinBody {
                url: url.to_string(),
                len: 0,
            });
        }
        Ok(html)
    }
}

async fn render_in(
    session: &mut dyn BrowserSession,
    url: &str,
    options: &NavigateOptions,
) -> Result<String, ScraperError> {
    session.navigate(url, options).await?;
    let mut html = session.content().await?;
    match session.frame_contents().await {
        Ok(frames) => {
            for frame in frames {
                html.push('\n');
                html.push_str(&frame);
            }
        }
        Err(e) => tracing::debug!(url, error = %e, "could not read frame contents"),
    }
    Ok(html)
}
