//! Centralized configuration management for cineadmin

use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "http://localhost:5259";
const DEFAULT_SESSION_PATH: &str = "./cineadmin_session.json";
const DEFAULT_PAGE_SIZE: usize = 10;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address every resource path is resolved against
    pub base_url: String,
    /// File holding the persisted session (token + username)
    pub session_path: PathBuf,
    /// Rows per page in list tables
    pub page_size: usize,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("cineadmin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_path: DEFAULT_SESSION_PATH.into(),
            page_size: DEFAULT_PAGE_SIZE,
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CINEADMIN_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let session_path = std::env::var("CINEADMIN_SESSION_PATH")
            .unwrap_or_else(|_| DEFAULT_SESSION_PATH.to_string())
            .into();

        let page_size = parse_env_var("CINEADMIN_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);

        let http = HttpConfig {
            user_agent: std::env::var("CINEADMIN_USER_AGENT")
                .unwrap_or_else(|_| HttpConfig::default().user_agent),
        };

        Ok(Config {
            base_url,
            session_path,
            page_size,
            http,
        })
    }

    /// Replace the base address, e.g. from a command line flag
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    /// Get session path as string
    pub fn session_path_str(&self) -> &str {
        self.session_path.to_str().unwrap_or(DEFAULT_SESSION_PATH)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;

        if self.page_size == 0 {
            return Err(anyhow::anyhow!("Page size must be at least 1"));
        }

        if let Some(parent) = self.session_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Session file directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
