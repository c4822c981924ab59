pub mod backoff;
pub mod block;
pub mod browser;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod firecrawl;
mod http;
pub mod select;

pub use browser::{BrowserEngine, BrowserSession, BrowserlessEngine, LaunchOptions, NavigateOptions};
pub use discovery::{Discovered, Discovery, DiscoveryConfig, DiscoveryMethod};
pub use error::ScraperError;
pub use fetch::{FetchResult, Fetcher, FetcherConfig, Tier, TierAttempt};
pub use firecrawl::{FirecrawlClient, RenderService, SiteMapper};
pub use select::{home_first, select, PageRole, SelectedPage};
