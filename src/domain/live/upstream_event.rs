//! Typed events delivered by the upstream room client.
//!
//! Every field carries a serde default so a payload with missing optional
//! data still decodes into a complete shape. Only the sender name is
//! mandatory; the normalizer rejects events without one.

use serde::{Deserialize, Serialize};

/// One event received from the upstream room connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum UpstreamEvent {
    Chat(ChatMessage),
    PaidMessage(PaidMessage),
    Gift(GiftMessage),
    MembershipPurchase(MembershipMessage),
    MembershipRenewal(MembershipMessage),
}

impl UpstreamEvent {
    /// Short name used in log fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            UpstreamEvent::Chat(_) => "chat",
            UpstreamEvent::PaidMessage(_) => "paid_message",
            UpstreamEvent::Gift(_) => "gift",
            UpstreamEvent::MembershipPurchase(_) => "membership_purchase",
            UpstreamEvent::MembershipRenewal(_) => "membership_renewal",
        }
    }
}

/// Plain chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessage {
    pub uname: String,
    pub uid: Option<u64>,
    /// Avatar URL, empty when the upstream omits it.
    pub face: String,
    /// Fan badge level, 0 when the sender wears no badge.
    pub medal_level: u32,
    /// Privilege code, see [`super::PrivilegeTier::from_code`].
    pub privilege_type: u8,
    /// Room moderator flag.
    pub admin: bool,
    pub msg: String,
    /// Unix seconds; `None` means "use receive time".
    pub timestamp: Option<i64>,
}

/// Premium highlighted message. `price` is already in base currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaidMessage {
    pub uname: String,
    pub uid: Option<u64>,
    pub face: String,
    pub medal_level: u32,
    pub privilege_type: u8,
    pub admin: bool,
    pub message: String,
    pub price: f64,
    pub timestamp: Option<i64>,
}

/// Gift event. Coin amounts are in upstream coin units (1000 per yuan).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftMessage {
    pub uname: String,
    pub uid: Option<u64>,
    pub face: String,
    pub medal_level: u32,
    pub privilege_type: u8,
    pub gift_name: String,
    /// Number of items, defaults to 1.
    pub num: u32,
    /// Unit face price in coins.
    pub price: u64,
    pub total_coin: u64,
    /// "gold" (purchasable) or "silver" (non-revenue).
    pub coin_type: String,
    /// Set when the gift is a mystery box whose content was revealed.
    pub mystery_box: bool,
    /// Revealed unit value of a mystery box, 0 when unknown.
    pub r_price: u64,
    pub timestamp: Option<i64>,
}

impl Default for GiftMessage {
    fn default() -> Self {
        Self {
            uname: String::new(),
            uid: None,
            face: String::new(),
            medal_level: 0,
            privilege_type: 0,
            gift_name: String::new(),
            num: 1,
            price: 0,
            total_coin: 0,
            coin_type: "gold".to_string(),
            mystery_box: false,
            r_price: 0,
            timestamp: None,
        }
    }
}

/// Membership purchase or renewal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipMessage {
    pub username: String,
    pub uid: Option<u64>,
    pub face: String,
    pub medal_level: u32,
    /// Membership level code, same table as chat privilege codes.
    pub guard_level: u8,
    /// Purchased quantity (months), defaults to 1.
    pub num: u32,
    /// Price per month in coins.
    pub price: u64,
    pub timestamp: Option<i64>,
}

impl Default for MembershipMessage {
    fn default() -> Self {
        Self {
            username: String::new(),
            uid: None,
            face: String::new(),
            medal_level: 0,
            guard_level: 0,
            num: 1,
            price: 0,
            timestamp: None,
        }
    }
}
