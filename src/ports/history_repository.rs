//! HistoryRepository port - Durable write-through storage of room events.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::live::{
    ChatRecord, GiftCatalogEntry, GiftRecord, HistoryRecord, MembershipRecord,
    PaidMessageRecord, RoomRecord,
};

/// Port for event history, room metadata and gift catalog persistence.
///
/// Each call is its own unit of work: implementations commit or roll back
/// per call and never batch across calls.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn insert_chat(&self, record: &ChatRecord) -> Result<(), DomainError>;

    async fn insert_paid_message(&self, record: &PaidMessageRecord) -> Result<(), DomainError>;

    async fn insert_gift(&self, record: &GiftRecord) -> Result<(), DomainError>;

    async fn insert_membership(&self, record: &MembershipRecord) -> Result<(), DomainError>;

    /// Updates title/host of an existing room row, inserts it otherwise.
    async fn upsert_room(&self, room: &RoomRecord) -> Result<(), DomainError>;

    /// Replaces the whole catalog. Returns the number of stored entries.
    async fn replace_gift_catalog(&self, entries: &[GiftCatalogEntry]) -> Result<usize, DomainError>;

    /// Routes a record to the insert for its table.
    async fn insert(&self, record: &HistoryRecord) -> Result<(), DomainError> {
        match record {
            HistoryRecord::Chat(r) => self.insert_chat(r).await,
            HistoryRecord::PaidMessage(r) => self.insert_paid_message(r).await,
            HistoryRecord::Gift(r) => self.insert_gift(r).await,
            HistoryRecord::Membership(r) => self.insert_membership(r).await,
        }
    }
}
