//! External map and render service seams, with a Firecrawl implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::ScraperError;

const MAP_TIMEOUT: Duration = Duration::from_secs(30);
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(20);

/// Enumerates the links of a site without crawling it ourselves.
#[async_trait]
pub trait SiteMapper: Send + Sync {
    async fn map(&self, url: &str) -> Result<Vec<String>, ScraperError>;
}

/// Renders a page remotely and returns its HTML.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, ScraperError>;
}

pub struct FirecrawlClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn post(&self, path: &str, body: &Value, timeout: Duration) -> Result<Value, ScraperError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SiteMapper for FirecrawlClient {
    async fn map(&self, url: &str) -> Result<Vec<String>, ScraperError> {
        let body = self.post("map", &json!({ "url": url }), MAP_TIMEOUT).await?;
        Ok(map_links(&body))
    }
}

#[async_trait]
impl RenderService for FirecrawlClient {
    async fn render(&self, url: &str) -> Result<String, ScraperError> {
        let body = self
            .post(
                "scrape",
                &json!({ "url": url, "formats": ["html"] }),
                SCRAPE_TIMEOUT,
            )
            .await?;
        Ok(scraped_html(&body))
    }
}

/// Links from a map response; entries may be `{ "url": ... }` objects or
/// plain strings depending on API version.
fn map_links(body: &Value) -> Vec<String> {
    body.get("links")
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .filter_map(|link| match link {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(String::from),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `html` from a scrape response, at top level or nested under `data`.
/// A response without it counts as an empty render.
fn scraped_html(body: &Value) -> String {
    body.get("html")
        .or_else(|| body.get("data").and_then(|d| d.get("html")))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_default()
}
