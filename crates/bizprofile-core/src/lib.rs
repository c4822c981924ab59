pub mod app_config;
pub mod config;
pub mod profile;
pub mod site_url;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_USER_AGENT};
pub use profile::{BusinessProfile, PartialProfile, Platform, SocialLinks};
pub use site_url::SiteUrl;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid URL \"{input}\": {reason}")]
    InvalidUrl { input: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
