//! Upstream provider configuration

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_TITLE: &str = "Helpdesk Support";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY must be set")]
    MissingApiKey,
    #[error("OPENROUTER_MODEL must be set")]
    MissingModel,
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Raw provider settings as read from the environment
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_url: Option<String>,
    /// Sent as `HTTP-Referer` for provider-side attribution
    pub app_url: Option<String>,
    /// Sent as `X-Title`
    pub app_title: Option<String>,
    pub timeout: Option<Duration>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            model: std::env::var("OPENROUTER_MODEL").ok(),
            api_url: std::env::var("OPENROUTER_API_URL").ok(),
            app_url: std::env::var("APP_URL").ok(),
            app_title: std::env::var("APP_TITLE").ok(),
            timeout: std::env::var("OPENROUTER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }

    /// Check required settings and fill in defaults.
    ///
    /// Blank values count as missing.
    pub fn validate(&self) -> Result<ProviderSettings, ConfigError> {
        let api_key = non_blank(self.api_key.as_deref()).ok_or(ConfigError::MissingApiKey)?;
        let model = non_blank(self.model.as_deref()).ok_or(ConfigError::MissingModel)?;

        Ok(ProviderSettings {
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_url: non_blank(self.api_url.as_deref())
                .unwrap_or(DEFAULT_API_URL)
                .to_string(),
            app_url: non_blank(self.app_url.as_deref())
                .unwrap_or(DEFAULT_APP_URL)
                .to_string(),
            app_title: non_blank(self.app_title.as_deref())
                .unwrap_or(DEFAULT_APP_TITLE)
                .to_string(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validated provider settings; only obtainable through [`LlmConfig::validate`]
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub app_url: String,
    pub app_title: String,
    pub timeout: Duration,
}
