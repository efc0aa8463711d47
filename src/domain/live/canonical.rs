//! Canonical outbound event shape.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RoomId, Timestamp, Uid};

use super::privilege::{IdentityRole, PrivilegeTier};

/// Kind of a normalized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Chat,
    PaidMessage,
    Gift,
    MembershipPurchase,
    MembershipRenewal,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Chat => "chat",
            EventKind::PaidMessage => "paid_message",
            EventKind::Gift => "gift",
            EventKind::MembershipPurchase => "membership_purchase",
            EventKind::MembershipRenewal => "membership_renewal",
        }
    }
}

/// Who sent an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    /// `None` for anonymous senders.
    pub uid: Option<Uid>,
    pub avatar: Option<String>,
    /// Fan badge level, 0 without badge.
    pub fan_level: u32,
}

/// Normalized result of one upstream event.
///
/// Built only by [`super::EventNormalizer`]; `monetary_value` is already in
/// base currency units and never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub kind: EventKind,
    pub room_id: RoomId,
    pub sender: Sender,
    pub privilege_tier: PrivilegeTier,
    pub identity_role: IdentityRole,
    /// Message body, chat and paid messages only.
    pub text: Option<String>,
    pub monetary_value: f64,
    /// Gift name or membership tier label.
    pub item_name: Option<String>,
    pub item_count: Option<u32>,
    pub item_image: Option<String>,
    pub created_at: Timestamp,
}

impl CanonicalEvent {
    pub fn needs_avatar(&self) -> bool {
        self.sender.avatar.is_none()
    }

    /// JSON payload sent to subscribers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
