//! Gift catalog refresh.

use std::sync::Arc;

use crate::domain::foundation::{Credential, DomainError, RoomId};
use crate::domain::live::GiftCatalogEntry;
use crate::ports::{GiftCatalogProvider, HistoryRepository, LookupError};

#[derive(Debug, thiserror::Error)]
pub enum GiftCatalogError {
    #[error("Gift catalog lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Failed to store gift catalog: {0}")]
    Storage(#[from] DomainError),
}

/// Fetches a room's gift panel and replaces the stored catalog with it.
pub struct GiftCatalogService {
    provider: Arc<dyn GiftCatalogProvider>,
    repository: Arc<dyn HistoryRepository>,
}

impl GiftCatalogService {
    pub fn new(
        provider: Arc<dyn GiftCatalogProvider>,
        repository: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            provider,
            repository,
        }
    }

    /// Replaces the stored catalog wholesale and returns the new entries.
    ///
    /// A failed fetch leaves the stored catalog untouched.
    pub async fn refresh(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<Vec<GiftCatalogEntry>, GiftCatalogError> {
        let entries = self.provider.gift_catalog(room_id, credential).await?;
        let stored = self.repository.replace_gift_catalog(&entries).await?;

        tracing::info!(room_id = %room_id, count = stored, "Gift catalog refreshed");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryHistoryRepository;
    use async_trait::async_trait;

    struct FakeProvider {
        result: Result<Vec<GiftCatalogEntry>, LookupError>,
    }

    #[async_trait]
    impl GiftCatalogProvider for FakeProvider {
        async fn gift_catalog(
            &self,
            _room_id: RoomId,
            _credential: Option<&Credential>,
        ) -> Result<Vec<GiftCatalogEntry>, LookupError> {
            self.result.clone()
        }
    }

    fn entry(name: &str, price: f64) -> GiftCatalogEntry {
        GiftCatalogEntry {
            name: name.to_string(),
            price,
            coin_type: "gold".to_string(),
            image: format!("https://img/{name}.png"),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_catalog_wholesale() {
        let repo = Arc::new(InMemoryHistoryRepository::new());
        repo.replace_gift_catalog(&[entry("old", 1.0)]).await.unwrap();
        let service = GiftCatalogService::new(
            Arc::new(FakeProvider {
                result: Ok(vec![entry("heart", 1000.0), entry("rocket", 500000.0)]),
            }),
            repo.clone(),
        );

        let entries = service.refresh(RoomId::new(1).unwrap(), None).await.unwrap();

        assert_eq!(entries.len(), 2);
        let names: Vec<_> = repo.gift_catalog().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["heart", "rocket"]);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_existing_catalog() {
        let repo = Arc::new(InMemoryHistoryRepository::new());
        repo.replace_gift_catalog(&[entry("old", 1.0)]).await.unwrap();
        let service = GiftCatalogService::new(
            Arc::new(FakeProvider {
                result: Err(LookupError::Network("down".into())),
            }),
            repo.clone(),
        );

        let err = service.refresh(RoomId::new(1).unwrap(), None).await.unwrap_err();

        assert!(matches!(err, GiftCatalogError::Lookup(_)));
        assert_eq!(repo.gift_catalog(), vec![entry("old", 1.0)]);
    }
}
