use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::DEFAULT_LIMIT;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the admin API (e.g. https://api.example.com)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token forwarded on every request
    pub token: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched page or prompt is served from memory (0 disables)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_ttl_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Web compose endpoint the reply link points at
    #[serde(default = "default_compose_url")]
    pub compose_url: String,
    /// Subject line of support replies
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Body template; `{name}` is replaced with the recipient's name
    #[serde(default = "default_body")]
    pub body: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            compose_url: default_compose_url(),
            subject: default_subject(),
            body: default_body(),
        }
    }
}

fn default_compose_url() -> String {
    "https://mail.google.com/mail/".to_string()
}

fn default_subject() -> String {
    "Re: Your support request".to_string()
}

fn default_body() -> String {
    "Hi {name},\n\nThanks for reaching out to our support team. \
     We've looked into your request and wanted to follow up.\n\n\
     Best regards,\nThe Support Team"
        .to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse configuration file")?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later at request time
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api.base_url must use http or https, got {}", url.scheme());
        }
        reqwest::Url::parse(&self.mail.compose_url)
            .with_context(|| format!("Invalid mail.compose_url: {}", self.mail.compose_url))?;
        if self.display.page_size == 0 {
            anyhow::bail!("display.page_size must be at least 1");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be at least 1");
        }
        Ok(())
    }
}
