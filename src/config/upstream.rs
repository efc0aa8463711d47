//! Upstream web API configuration (room info, profiles, gift panel).

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::bilibili::{
    BilibiliApiConfig, DEFAULT_LIVE_API, DEFAULT_MAIN_API, DEFAULT_USER_AGENT,
};

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_live_api_url")]
    pub live_api_url: String,

    #[serde(default = "default_main_api_url")]
    pub main_api_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attempts per profile lookup while rate limited
    #[serde(default = "default_profile_attempts")]
    pub profile_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Backfill missing avatars through profile lookups
    #[serde(default = "default_avatar_backfill")]
    pub avatar_backfill: bool,
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Settings for the web API client.
    pub fn api_config(&self) -> BilibiliApiConfig {
        BilibiliApiConfig::default()
            .with_base_urls(&self.live_api_url, &self.main_api_url)
            .with_user_agent(&self.user_agent)
            .with_timeout(self.request_timeout())
            .with_profile_attempts(self.profile_attempts)
            .with_retry_delay(self.retry_delay())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for url in [&self.live_api_url, &self.main_api_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidApiUrl(url.clone()));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("upstream.request_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            live_api_url: default_live_api_url(),
            main_api_url: default_main_api_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            profile_attempts: default_profile_attempts(),
            retry_delay_ms: default_retry_delay(),
            avatar_backfill: default_avatar_backfill(),
        }
    }
}

fn default_live_api_url() -> String {
    DEFAULT_LIVE_API.to_string()
}

fn default_main_api_url() -> String {
    DEFAULT_MAIN_API.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_profile_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_avatar_backfill() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_public_api() {
        let config = UpstreamConfig::default();
        assert_eq!(config.live_api_url, DEFAULT_LIVE_API);
        assert_eq!(config.profile_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_config_carries_overrides() {
        let config = UpstreamConfig {
            live_api_url: "http://localhost:9000".to_string(),
            request_timeout_secs: 2,
            retry_delay_ms: 50,
            ..Default::default()
        };
        let api = config.api_config();
        assert_eq!(api.live_base_url, "http://localhost:9000");
        assert_eq!(api.timeout, Duration::from_secs(2));
        assert_eq!(api.retry_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_validation_rejects_non_http_url() {
        let config = UpstreamConfig {
            main_api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidApiUrl(_))));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = UpstreamConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
