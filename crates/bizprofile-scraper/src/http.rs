//! Shared `reqwest` plumbing for page and sitemap fetches.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};

use crate::error::ScraperError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Build a client that presents as a desktop browser.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed.
pub(crate) fn browser_like_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<Client, ScraperError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// GET `url` and return `(status, body)` regardless of status.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<(u16, String), ScraperError> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

/// GET `url` and return the body only for a 2xx response.
pub(crate) async fn get_ok_text(client: &Client, url: &str) -> Result<String, ScraperError> {
    let (_, body) = get_ok_page(client, url).await?;
    Ok(body)
}

/// GET `url`, following redirects, and return the URL that finally served
/// the page with its body. Non-2xx responses are errors.
pub(crate) async fn get_ok_page(client: &Client, url: &str) -> Result<(Url, String), ScraperError> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    let landed = response.url().clone();
    if !(200..300).contains(&status) {
        return Err(ScraperError::UnexpectedStatus {
            status,
            url: url.to_string(),
        });
    }
    let body = response.text().await?;
    Ok((landed, body))
}
