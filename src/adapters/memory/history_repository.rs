//! In-memory implementation of HistoryRepository.
//!
//! Keeps every row in process memory. Useful for tests and for running the
//! relay without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, RoomId};
use crate::domain::live::{
    ChatRecord, GiftCatalogEntry, GiftRecord, MembershipRecord, PaidMessageRecord, RoomRecord,
};
use crate::ports::HistoryRepository;

#[derive(Default)]
struct Tables {
    chats: Vec<ChatRecord>,
    paid_messages: Vec<PaidMessageRecord>,
    gifts: Vec<GiftRecord>,
    memberships: Vec<MembershipRecord>,
    rooms: HashMap<RoomId, RoomRecord>,
    gift_catalog: Vec<GiftCatalogEntry>,
}

/// In-memory history store.
#[derive(Default)]
pub struct InMemoryHistoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chats(&self) -> Vec<ChatRecord> {
        self.read(|t| t.chats.clone())
    }

    pub fn paid_messages(&self) -> Vec<PaidMessageRecord> {
        self.read(|t| t.paid_messages.clone())
    }

    pub fn gifts(&self) -> Vec<GiftRecord> {
        self.read(|t| t.gifts.clone())
    }

    pub fn memberships(&self) -> Vec<MembershipRecord> {
        self.read(|t| t.memberships.clone())
    }

    pub fn room(&self, room_id: RoomId) -> Option<RoomRecord> {
        self.read(|t| t.rooms.get(&room_id).cloned())
    }

    pub fn gift_catalog(&self) -> Vec<GiftCatalogEntry> {
        self.read(|t| t.gift_catalog.clone())
    }

    /// Number of history rows across all four history tables.
    pub fn total_inserts(&self) -> usize {
        self.read(|t| t.chats.len() + t.paid_messages.len() + t.gifts.len() + t.memberships.len())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().unwrap_or_else(|p| p.into_inner());
        f(&tables)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, DomainError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "Lock poisoned"))?;
        Ok(f(&mut tables))
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn insert_chat(&self, record: &ChatRecord) -> Result<(), DomainError> {
        self.write(|t| t.chats.push(record.clone()))
    }

    async fn insert_paid_message(&self, record: &PaidMessageRecord) -> Result<(), DomainError> {
        self.write(|t| t.paid_messages.push(record.clone()))
    }

    async fn insert_gift(&self, record: &GiftRecord) -> Result<(), DomainError> {
        self.write(|t| t.gifts.push(record.clone()))
    }

    async fn insert_membership(&self, record: &MembershipRecord) -> Result<(), DomainError> {
        self.write(|t| t.memberships.push(record.clone()))
    }

    async fn upsert_room(&self, room: &RoomRecord) -> Result<(), DomainError> {
        self.write(|t| {
            t.rooms.insert(room.room_id, room.clone());
        })
    }

    async fn replace_gift_catalog(&self, entries: &[GiftCatalogEntry]) -> Result<usize, DomainError> {
        self.write(|t| {
            t.gift_catalog = entries.to_vec();
            entries.len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::live::{HistoryRecord, SenderColumns};

    fn sender() -> SenderColumns {
        SenderColumns {
            room_id: RoomId::new(1).unwrap(),
            user_name: "viewer".into(),
            uid: None,
            fan_level: 0,
            privilege: "none".into(),
            identity: "normal".into(),
            avatar: None,
            created_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn insert_routes_record_to_its_table() {
        let repo = InMemoryHistoryRepository::new();

        repo.insert(&HistoryRecord::Chat(ChatRecord {
            sender: sender(),
            text: "hi".into(),
        }))
        .await
        .unwrap();
        repo.insert(&HistoryRecord::Gift(GiftRecord {
            sender: sender(),
            gift_name: "heart".into(),
            gift_count: 2,
            price: 0.2,
        }))
        .await
        .unwrap();

        assert_eq!(repo.chats().len(), 1);
        assert_eq!(repo.gifts().len(), 1);
        assert!(repo.paid_messages().is_empty());
        assert_eq!(repo.total_inserts(), 2);
    }

    #[tokio::test]
    async fn upsert_room_overwrites_title_and_host() {
        let repo = InMemoryHistoryRepository::new();
        let room_id = RoomId::new(1).unwrap();
        let mut record = RoomRecord {
            room_id,
            title: "old".into(),
            host: "Unknown".into(),
        };
        repo.upsert_room(&record).await.unwrap();
        record.title = "new".into();
        record.host = "Host".into();
        repo.upsert_room(&record).await.unwrap();

        assert_eq!(repo.room(room_id), Some(record));
    }
}
