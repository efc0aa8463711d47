//! Upstream web API adapters (room info, sender profiles, gift panel).

mod client;
mod dto;
mod mock;

pub use client::{BilibiliApiClient, BilibiliApiConfig, DEFAULT_LIVE_API, DEFAULT_MAIN_API, DEFAULT_USER_AGENT};
pub use mock::MockBilibiliApi;
