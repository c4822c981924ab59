//! [`BrowserEngine`] backed by a Browserless `/function` endpoint.
//!
//! Each navigation runs one puppeteer function on the remote service inside a
//! fresh browser. The remote browser lives only for the duration of that HTTP
//! call, so dropping the in-flight future aborts the request and Browserless
//! tears the browser down.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{BrowserEngine, BrowserSession, LaunchOptions, NavigateOptions};
use crate::error::ScraperError;

/// Extra time granted to the HTTP call beyond the navigation timeout, covering
/// browser start, the settle delay and scrolling.
const REQUEST_GRACE: Duration = Duration::from_secs(30);

const NAVIGATE_FUNCTION: &str = r#"
export default async function ({ page, context }) {
  if (context.userAgent) {
    await page.setUserAgent(context.userAgent);
  }
  if (context.stealthScript) {
    await page.evaluateOnNewDocument(context.stealthScript);
  }
  await page.setExtraHTTPHeaders({ "Accept-Language": "en-US,en;q=0.9" });
  await page.goto(context.url, { waitUntil: "networkidle2", timeout: context.timeoutMs });
  await new Promise((resolve) => setTimeout(resolve, context.settleMs));
  if (context.scroll) {
    await page.evaluate(async () => {
      for (let y = 0; y < document.body.scrollHeight; y += 600) {
        window.scrollTo(0, y);
        await new Promise((resolve) => setTimeout(resolve, 100));
      }
    });
    await new Promise((resolve) => setTimeout(resolve, 500));
  }
  const html = await page.content();
  const origin = new URL(page.url()).origin;
  const frames = [];
  for (const frame of page.frames()) {
    if (frame === page.mainFrame()) continue;
    try {
      if (new URL(frame.url()).origin !== origin) continue;
      frames.push(await frame.content());
    } catch (_) {}
  }
  return { data: { html, frames }, type: "application/json" };
}
"#;

#[derive(Debug, Deserialize)]
struct RenderedPage {
    #[serde(default)]
    html: String,
    #[serde(default)]
    frames: Vec<String>,
}

pub struct BrowserlessEngine {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessEngine {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }
}

#[async_trait]
impl BrowserEngine for BrowserlessEngine {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>, ScraperError> {
        Ok(Box::new(BrowserlessSession {
            client: self.client.clone(),
            endpoint: format!("{}/function", self.base_url),
            token: self.token.clone(),
            options: options.clone(),
            page: None,
        }))
    }
}

struct BrowserlessSession {
    client: Client,
    endpoint: String,
    token: Option<String>,
    options: LaunchOptions,
    page: Option<RenderedPage>,
}

impl BrowserlessSession {
    fn rendered(&mut self) -> Result<&mut RenderedPage, ScraperError> {
        self.page
            .as_mut()
            .ok_or_else(|| ScraperError::Browser("content requested before navigation".to_string()))
    }
}

#[async_trait]
impl BrowserSession for BrowserlessSession {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<(), ScraperError> {
        let launch = json!({ "headless": self.options.headless, "stealth": true }).to_string();
        let mut query = vec![("launch", launch)];
        if let Some(token) = &self.token {
            query.push(("token", token.clone()));
        }

        let body = json!({
            "code": NAVIGATE_FUNCTION,
            "context": {
                "url": url,
                "userAgent": self.options.user_agent,
                "stealthScript": self.options.stealth_script,
                "timeoutMs": u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
                "settleMs": u64::try_from(options.settle.as_millis()).unwrap_or(u64::MAX),
                "scroll": options.scroll,
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&query)
            .timeout(options.timeout + options.settle + REQUEST_GRACE)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScraperError::Browser(format!(
                "browserless returned {}: {}",
                status.as_u16(),
                message.chars().take(200).collect::<String>()
            )));
        }

        let page: RenderedPage = response.json().await?;
        self.page = Some(page);
        Ok(())
    }

    async fn content(&mut self) -> Result<String, ScraperError> {
        Ok(self.rendered()?.html.clone())
    }

    async fn frame_contents(&mut self) -> Result<Vec<String>, ScraperError> {
        Ok(std::mem::take(&mut self.rendered()?.frames))
    }

    async fn close(self: Box<Self>) {}
}
