//! GiftCatalogProvider port - A room's purchasable gift list.

use async_trait::async_trait;

use crate::domain::foundation::{Credential, RoomId};
use crate::domain::live::GiftCatalogEntry;

use super::LookupError;

/// Port for fetching the gift panel of a room.
#[async_trait]
pub trait GiftCatalogProvider: Send + Sync {
    /// Full current catalog (platform-wide and room-specific items).
    async fn gift_catalog(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<Vec<GiftCatalogEntry>, LookupError>;
}
