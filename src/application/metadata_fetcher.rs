//! Room metadata fetcher - best-effort title/host resolution at listen start.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{Credential, DomainError, RoomId};
use crate::domain::live::RoomRecord;
use crate::ports::{HistoryRepository, LookupError, RoomInfoProvider};

/// Host name stored when the host lookup fails.
pub const UNKNOWN_HOST: &str = "Unknown";

/// Why room metadata could not be recorded.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Room info lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// The record was resolved but could not be stored
    #[error("Failed to store room record: {error}")]
    Storage { record: RoomRecord, error: DomainError },
}

impl MetadataError {
    /// The resolved record, if resolution got that far.
    pub fn resolved_record(&self) -> Option<&RoomRecord> {
        match self {
            MetadataError::Lookup(_) => None,
            MetadataError::Storage { record, .. } => Some(record),
        }
    }
}

/// Resolves a room's title and host and upserts the room record.
pub struct RoomMetadataFetcher {
    rooms: Arc<dyn RoomInfoProvider>,
    repository: Arc<dyn HistoryRepository>,
    timeout: Duration,
}

impl RoomMetadataFetcher {
    pub fn new(
        rooms: Arc<dyn RoomInfoProvider>,
        repository: Arc<dyn HistoryRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            rooms,
            repository,
            timeout,
        }
    }

    /// Resolves and stores the room record.
    ///
    /// Failures are logged here and returned for the caller to report; they
    /// never affect the listen itself.
    pub async fn fetch_and_store(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<RoomRecord, MetadataError> {
        let record = tokio::time::timeout(self.timeout, self.resolve(room_id, credential))
            .await
            .unwrap_or(Err(LookupError::Timeout))
            .map_err(|err| {
                tracing::warn!(room_id = %room_id, error = %err, "Room info lookup failed");
                MetadataError::Lookup(err)
            })?;

        if let Err(error) = self.repository.upsert_room(&record).await {
            tracing::error!(room_id = %room_id, error = %error, "Failed to store room record");
            return Err(MetadataError::Storage { record, error });
        }

        tracing::info!(room_id = %room_id, title = %record.title, host = %record.host, "Room info saved");
        Ok(record)
    }

    async fn resolve(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<RoomRecord, LookupError> {
        let info = self.rooms.room_info(room_id, credential).await?;

        let host = match info.host_uid {
            Some(uid) => match self.rooms.host_name(uid, credential).await {
                Ok(name) if !name.trim().is_empty() => name,
                Ok(_) => UNKNOWN_HOST.to_string(),
                Err(err) => {
                    tracing::debug!(room_id = %room_id, uid = %uid, error = %err, "Host name lookup failed");
                    UNKNOWN_HOST.to_string()
                }
            },
            None => UNKNOWN_HOST.to_string(),
        };

        Ok(RoomRecord {
            room_id,
            title: info.title,
            host,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryHistoryRepository;
    use crate::domain::foundation::Uid;
    use crate::ports::RoomInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeRooms {
        info: Result<RoomInfo, LookupError>,
        host: Result<String, LookupError>,
        delay: Duration,
        saw_credential: Mutex<Vec<bool>>,
    }

    impl FakeRooms {
        fn ok(title: &str, host: Result<String, LookupError>) -> Self {
            Self {
                info: Ok(RoomInfo {
                    title: title.to_string(),
                    host_uid: Some(Uid::new(42)),
                }),
                host,
                delay: Duration::ZERO,
                saw_credential: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RoomInfoProvider for FakeRooms {
        async fn room_info(
            &self,
            _room_id: RoomId,
            credential: Option<&Credential>,
        ) -> Result<RoomInfo, LookupError> {
            self.saw_credential.lock().unwrap().push(credential.is_some());
            tokio::time::sleep(self.delay).await;
            self.info.clone()
        }

        async fn host_name(
            &self,
            _host_uid: Uid,
            _credential: Option<&Credential>,
        ) -> Result<String, LookupError> {
            self.host.clone()
        }
    }

    fn room() -> RoomId {
        RoomId::new(12345).unwrap()
    }

    fn fetcher(rooms: FakeRooms) -> (RoomMetadataFetcher, Arc<InMemoryHistoryRepository>) {
        let repo = Arc::new(InMemoryHistoryRepository::new());
        let fetcher = RoomMetadataFetcher::new(Arc::new(rooms), repo.clone(), Duration::from_millis(100));
        (fetcher, repo)
    }

    #[tokio::test]
    async fn stores_resolved_title_and_host() {
        let (fetcher, repo) = fetcher(FakeRooms::ok("Evening stream", Ok("Host".into())));

        let record = fetcher.fetch_and_store(room(), None).await.unwrap();

        assert_eq!(record.title, "Evening stream");
        assert_eq!(record.host, "Host");
        assert_eq!(repo.room(room()), Some(record));
    }

    #[tokio::test]
    async fn failed_host_lookup_falls_back_to_unknown() {
        let (fetcher, repo) =
            fetcher(FakeRooms::ok("Title", Err(LookupError::Network("reset".into()))));

        let record = fetcher.fetch_and_store(room(), None).await.unwrap();

        assert_eq!(record.host, UNKNOWN_HOST);
        assert_eq!(repo.room(room()).unwrap().host, UNKNOWN_HOST);
    }

    #[tokio::test]
    async fn failed_room_lookup_stores_nothing() {
        let mut rooms = FakeRooms::ok("unused", Ok("Host".into()));
        rooms.info = Err(LookupError::Api {
            code: 1,
            message: "room not found".into(),
        });
        let (fetcher, repo) = fetcher(rooms);

        let err = fetcher.fetch_and_store(room(), None).await.unwrap_err();

        assert!(err.resolved_record().is_none());
        assert!(err.to_string().contains("room not found"));
        assert!(repo.room(room()).is_none());
    }

    #[tokio::test]
    async fn slow_lookup_is_bounded() {
        let mut rooms = FakeRooms::ok("Title", Ok("Host".into()));
        rooms.delay = Duration::from_secs(5);
        let (fetcher, _) = fetcher(rooms);

        let err = fetcher.fetch_and_store(room(), None).await.unwrap_err();

        assert!(matches!(err, MetadataError::Lookup(LookupError::Timeout)));
    }

    #[tokio::test]
    async fn reuses_credential_when_present() {
        let rooms = Arc::new(FakeRooms::ok("Title", Ok("Host".into())));
        let repo = Arc::new(InMemoryHistoryRepository::new());
        let fetcher = RoomMetadataFetcher::new(rooms.clone(), repo, Duration::from_secs(1));
        let credential = Credential::new("token");

        fetcher.fetch_and_store(room(), credential.as_ref()).await.unwrap();
        fetcher.fetch_and_store(room(), None).await.unwrap();

        assert_eq!(*rooms.saw_credential.lock().unwrap(), vec![true, false]);
    }
}
