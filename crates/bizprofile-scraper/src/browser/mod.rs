//! Browser automation seam used by the headless and headful fetch tiers.
//!
//! A [`BrowserEngine`] launches one [`BrowserSession`] per page fetch. Sessions
//! are never reused across requests; implementations must release every
//! resource they hold when the session is closed *or dropped*, so cancelling a
//! scrape mid-navigation leaks nothing.

mod browserless;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

pub use browserless::BrowserlessEngine;

/// Script injected before any page script runs to hide common automation
/// fingerprints (`navigator.webdriver`, empty plugin list, missing `chrome`).
pub const STEALTH_SCRIPT: &str = r"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
window.chrome = window.chrome || { runtime: {} };
";

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub user_agent: String,
    /// Fingerprint-reduction script evaluated on every new document.
    pub stealth_script: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NavigateOptions {
    pub timeout: Duration,
    /// Delay after load so client-side rendering can finish.
    pub settle: Duration,
    /// Scroll to the bottom to trigger lazy-loaded content.
    pub scroll: bool,
}

#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Start a fresh, isolated browser context.
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>, ScraperError>;
}

#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<(), ScraperError>;

    /// Serialized HTML of the main document after navigation.
    async fn content(&mut self) -> Result<String, ScraperError>;

    /// HTML of same-origin child frames, in frame order.
    async fn frame_contents(&mut self) -> Result<Vec<String>, ScraperError>;

    /// Tear the session down.
    async fn close(self: Box<Self>);
}
