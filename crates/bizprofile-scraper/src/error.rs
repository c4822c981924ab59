use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} too short ({len} bytes)")]
    ThinBody { url: String, len: usize },

    #[error("sitemap parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("browser session pool closed")]
    PoolClosed,
}
