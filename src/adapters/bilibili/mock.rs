//! Mock web API for testing and offline runs.
//!
//! Implements every lookup port with configurable answers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{Credential, RoomId, Uid};
use crate::domain::live::GiftCatalogEntry;
use crate::ports::{GiftCatalogProvider, LookupError, ProfileLookup, RoomInfo, RoomInfoProvider};

const MOCK_HOST_UID: u64 = 1;

#[derive(Debug, Default)]
struct MockApiState {
    title: Option<String>,
    host: Option<String>,
    room_info_error: Option<LookupError>,
    avatars: HashMap<u64, String>,
    gifts: Vec<GiftCatalogEntry>,
    lookups: Vec<Uid>,
}

#[derive(Debug, Clone, Default)]
pub struct MockBilibiliApi {
    state: Arc<Mutex<MockApiState>>,
}

impl MockBilibiliApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers room lookups with this title and host.
    pub fn with_room(self, title: impl Into<String>, host: impl Into<String>) -> Self {
        {
            let mut state = self.lock();
            state.title = Some(title.into());
            state.host = Some(host.into());
        }
        self
    }

    pub fn with_gifts(self, gifts: Vec<GiftCatalogEntry>) -> Self {
        self.lock().gifts = gifts;
        self
    }

    /// Makes every later room lookup fail.
    pub fn fail_room_info(&self) {
        self.lock().room_info_error = Some(LookupError::Network("mock failure".to_string()));
    }

    pub fn set_avatar(&self, uid: u64, url: impl Into<String>) {
        self.lock().avatars.insert(uid, url.into());
    }

    /// Uids passed to profile lookups, in call order.
    pub fn profile_lookups(&self) -> Vec<Uid> {
        self.lock().lookups.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockApiState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl RoomInfoProvider for MockBilibiliApi {
    async fn room_info(
        &self,
        room_id: RoomId,
        _credential: Option<&Credential>,
    ) -> Result<RoomInfo, LookupError> {
        let state = self.lock();
        if let Some(err) = &state.room_info_error {
            return Err(err.clone());
        }
        Ok(RoomInfo {
            title: state
                .title
                .clone()
                .unwrap_or_else(|| format!("Room {}", room_id)),
            host_uid: Some(Uid::new(MOCK_HOST_UID)),
        })
    }

    async fn host_name(
        &self,
        _host_uid: Uid,
        _credential: Option<&Credential>,
    ) -> Result<String, LookupError> {
        Ok(self.lock().host.clone().unwrap_or_default())
    }
}

#[async_trait]
impl ProfileLookup for MockBilibiliApi {
    async fn avatar(
        &self,
        uid: Uid,
        _credential: Option<&Credential>,
    ) -> Result<Option<String>, LookupError> {
        let mut state = self.lock();
        state.lookups.push(uid);
        Ok(state.avatars.get(&uid.as_u64()).cloned())
    }
}

#[async_trait]
impl GiftCatalogProvider for MockBilibiliApi {
    async fn gift_catalog(
        &self,
        _room_id: RoomId,
        _credential: Option<&Credential>,
    ) -> Result<Vec<GiftCatalogEntry>, LookupError> {
        Ok(self.lock().gifts.clone())
    }
}
