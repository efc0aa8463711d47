//! Persistence records derived from canonical events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RoomId, Timestamp, Uid};

use super::canonical::{CanonicalEvent, EventKind};

/// Fields shared by every history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderColumns {
    pub room_id: RoomId,
    pub user_name: String,
    pub uid: Option<Uid>,
    pub fan_level: u32,
    pub privilege: String,
    pub identity: String,
    pub avatar: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub sender: SenderColumns,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidMessageRecord {
    pub sender: SenderColumns,
    pub text: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftRecord {
    pub sender: SenderColumns,
    pub gift_name: String,
    pub gift_count: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub sender: SenderColumns,
    pub tier: String,
    pub months: u32,
    pub price: f64,
    /// False for renewals.
    pub is_purchase: bool,
}

/// One row destined for one of the history tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryRecord {
    Chat(ChatRecord),
    PaidMessage(PaidMessageRecord),
    Gift(GiftRecord),
    Membership(MembershipRecord),
}

impl HistoryRecord {
    /// Projects a canonical event onto its history row.
    pub fn from_event(event: &CanonicalEvent) -> Self {
        let sender = SenderColumns {
            room_id: event.room_id,
            user_name: event.sender.name.clone(),
            uid: event.sender.uid,
            fan_level: event.sender.fan_level,
            privilege: event.privilege_tier.label().to_string(),
            identity: event.identity_role.label().to_string(),
            avatar: event.sender.avatar.clone(),
            created_at: event.created_at,
        };
        let text = event.text.clone().unwrap_or_default();
        let item_name = event.item_name.clone().unwrap_or_default();
        let item_count = event.item_count.unwrap_or(1);

        match event.kind {
            EventKind::Chat => HistoryRecord::Chat(ChatRecord { sender, text }),
            EventKind::PaidMessage => HistoryRecord::PaidMessage(PaidMessageRecord {
                sender,
                text,
                price: event.monetary_value,
            }),
            EventKind::Gift => HistoryRecord::Gift(GiftRecord {
                sender,
                gift_name: item_name,
                gift_count: item_count,
                price: event.monetary_value,
            }),
            EventKind::MembershipPurchase | EventKind::MembershipRenewal => {
                HistoryRecord::Membership(MembershipRecord {
                    sender,
                    tier: item_name,
                    months: item_count,
                    price: event.monetary_value,
                    is_purchase: event.kind == EventKind::MembershipPurchase,
                })
            }
        }
    }

    /// Name of the history table this record belongs to.
    pub fn table(&self) -> &'static str {
        match self {
            HistoryRecord::Chat(_) => "chat_history",
            HistoryRecord::PaidMessage(_) => "paid_message_history",
            HistoryRecord::Gift(_) => "gift_history",
            HistoryRecord::Membership(_) => "membership_history",
        }
    }
}

/// Room metadata resolved at listen start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub room_id: RoomId,
    pub title: String,
    pub host: String,
}

/// One purchasable item of a room's gift panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftCatalogEntry {
    pub name: String,
    /// Unit price in coins.
    pub price: f64,
    pub coin_type: String,
    pub image: String,
}
