//! HTTP client for the upstream web API side lookups.
//!
//! Implements [`RoomInfoProvider`], [`ProfileLookup`] and
//! [`GiftCatalogProvider`]. Requests carry the credential as a `SESSDATA`
//! cookie when one is supplied and go out anonymously otherwise.
//!
//! # Configuration
//!
//! ```ignore
//! let config = BilibiliApiConfig::default()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_profile_attempts(3);
//! let api = BilibiliApiClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::header::{COOKIE, REFERER, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::foundation::{Credential, RoomId, Uid};
use crate::domain::live::GiftCatalogEntry;
use crate::ports::{GiftCatalogProvider, LookupError, ProfileLookup, RoomInfo, RoomInfoProvider};

use super::dto::{ApiEnvelope, GiftPanelData, MasterInfoData, RoomInfoData, SpaceInfoData};

pub const DEFAULT_LIVE_API: &str = "https://api.live.bilibili.com";
pub const DEFAULT_MAIN_API: &str = "https://api.bilibili.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct BilibiliApiConfig {
    pub live_base_url: String,
    pub main_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Attempts per profile lookup, retried while rate limited.
    pub profile_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for BilibiliApiConfig {
    fn default() -> Self {
        Self {
            live_base_url: DEFAULT_LIVE_API.to_string(),
            main_base_url: DEFAULT_MAIN_API.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            profile_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl BilibiliApiConfig {
    pub fn with_base_urls(mut self, live: impl Into<String>, main: impl Into<String>) -> Self {
        self.live_base_url = live.into();
        self.main_base_url = main.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_profile_attempts(mut self, attempts: u32) -> Self {
        self.profile_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

pub struct BilibiliApiClient {
    config: BilibiliApiConfig,
    http: Client,
}

impl BilibiliApiClient {
    pub fn new(config: BilibiliApiConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    fn live_url(&self, path: &str) -> String {
        format!("{}{}", self.config.live_base_url.trim_end_matches('/'), path)
    }

    fn main_url(&self, path: &str) -> String {
        format!("{}{}", self.config.main_base_url.trim_end_matches('/'), path)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
        credential: Option<&Credential>,
        referer: Option<String>,
    ) -> Result<T, LookupError> {
        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header(USER_AGENT, &self.config.user_agent);
        if let Some(credential) = credential {
            request = request.header(COOKIE, format!("SESSDATA={}", credential.expose()));
        }
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request.send().await.map_err(map_request_error)?;
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;
        envelope.into_data()
    }
}

fn map_request_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::Timeout
    } else if e.is_connect() {
        LookupError::Network(format!("Connection failed: {}", e))
    } else {
        LookupError::Network(e.to_string())
    }
}

#[async_trait]
impl RoomInfoProvider for BilibiliApiClient {
    async fn room_info(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<RoomInfo, LookupError> {
        let data: RoomInfoData = self
            .get_data(
                self.live_url("/room/v1/Room/get_info"),
                &[("room_id", room_id.to_string())],
                credential,
                None,
            )
            .await?;

        Ok(RoomInfo {
            title: data.title,
            host_uid: (data.uid != 0).then(|| Uid::new(data.uid)),
        })
    }

    async fn host_name(
        &self,
        host_uid: Uid,
        credential: Option<&Credential>,
    ) -> Result<String, LookupError> {
        let data: MasterInfoData = self
            .get_data(
                self.live_url("/live_user/v1/Master/info"),
                &[("uid", host_uid.to_string())],
                credential,
                None,
            )
            .await?;
        Ok(data.info.uname)
    }
}

#[async_trait]
impl ProfileLookup for BilibiliApiClient {
    async fn avatar(
        &self,
        uid: Uid,
        credential: Option<&Credential>,
    ) -> Result<Option<String>, LookupError> {
        let url = self.main_url("/x/space/acc/info");
        let attempts = self.config.profile_attempts.max(1);
        let mut last_error = LookupError::RateLimited;

        for attempt in 1..=attempts {
            let result: Result<SpaceInfoData, LookupError> = self
                .get_data(url.clone(), &[("mid", uid.to_string())], credential, None)
                .await;

            match result {
                Ok(data) => return Ok(Some(data.face).filter(|face| !face.is_empty())),
                Err(err @ (LookupError::RateLimited | LookupError::Network(_) | LookupError::Timeout)) => {
                    tracing::warn!(uid = %uid, attempt, attempts, error = %err, "Profile lookup failed, retrying");
                    last_error = err;
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl GiftCatalogProvider for BilibiliApiClient {
    async fn gift_catalog(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<Vec<GiftCatalogEntry>, LookupError> {
        let data: GiftPanelData = self
            .get_data(
                self.live_url("/xlive/web-room/v1/giftPanel/roomGiftList"),
                &[("platform", "pc".to_string()), ("room_id", room_id.to_string())],
                credential,
                Some(format!("https://live.bilibili.com/{}", room_id)),
            )
            .await?;
        Ok(data.into_entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = BilibiliApiConfig::default()
            .with_base_urls("http://localhost:9000/", "http://localhost:9001")
            .with_profile_attempts(0)
            .with_timeout(Duration::from_secs(2));

        assert_eq!(config.profile_attempts, 1);
        assert_eq!(config.timeout, Duration::from_secs(2));

        let client = BilibiliApiClient::new(config).unwrap();
        assert_eq!(
            client.live_url("/room/v1/Room/get_info"),
            "http://localhost:9000/room/v1/Room/get_info"
        );
        assert_eq!(client.main_url("/x/space/acc/info"), "http://localhost:9001/x/space/acc/info");
    }

    #[tokio::test]
    async fn unreachable_api_reports_network_error() {
        let config = BilibiliApiConfig::default()
            .with_base_urls("http://127.0.0.1:1", "http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let client = BilibiliApiClient::new(config).unwrap();

        let err = client
            .room_info(RoomId::new(1).unwrap(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::Network(_) | LookupError::Timeout));
    }
}
