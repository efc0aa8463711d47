//! Upstream event classification and price normalization.

use crate::domain::foundation::{RoomId, Timestamp, Uid};

use super::canonical::{CanonicalEvent, EventKind, Sender};
use super::errors::NormalizeError;
use super::pricing;
use super::privilege::{IdentityRole, PrivilegeTier};
use super::records::HistoryRecord;
use super::skins::MembershipSkinTable;
use super::upstream_event::{
    ChatMessage, GiftMessage, MembershipMessage, PaidMessage, UpstreamEvent,
};

/// Maps raw upstream events to [`CanonicalEvent`]s.
///
/// Holds only immutable configuration, so one instance can be shared
/// across tasks.
#[derive(Debug, Clone, Default)]
pub struct EventNormalizer {
    skins: MembershipSkinTable,
}

impl EventNormalizer {
    pub fn new(skins: MembershipSkinTable) -> Self {
        Self { skins }
    }

    /// Produces exactly one canonical event for `event`.
    ///
    /// `received_at` is used when the upstream payload carries no timestamp.
    pub fn normalize(
        &self,
        room_id: RoomId,
        event: &UpstreamEvent,
        received_at: Timestamp,
    ) -> Result<CanonicalEvent, NormalizeError> {
        match event {
            UpstreamEvent::Chat(chat) => normalize_chat(room_id, chat, received_at),
            UpstreamEvent::PaidMessage(paid) => normalize_paid_message(room_id, paid, received_at),
            UpstreamEvent::Gift(gift) => normalize_gift(room_id, gift, received_at),
            UpstreamEvent::MembershipPurchase(m) => {
                self.normalize_membership(room_id, m, EventKind::MembershipPurchase, received_at)
            }
            UpstreamEvent::MembershipRenewal(m) => {
                self.normalize_membership(room_id, m, EventKind::MembershipRenewal, received_at)
            }
        }
    }

    /// Canonical event together with its history row.
    pub fn normalize_with_record(
        &self,
        room_id: RoomId,
        event: &UpstreamEvent,
        received_at: Timestamp,
    ) -> Result<(CanonicalEvent, HistoryRecord), NormalizeError> {
        let canonical = self.normalize(room_id, event, received_at)?;
        let record = HistoryRecord::from_event(&canonical);
        Ok((canonical, record))
    }

    fn normalize_membership(
        &self,
        room_id: RoomId,
        m: &MembershipMessage,
        kind: EventKind,
        received_at: Timestamp,
    ) -> Result<CanonicalEvent, NormalizeError> {
        let tier = PrivilegeTier::from_code(m.guard_level);
        let sender = sender(kind, &m.username, m.uid, &m.face, m.medal_level)?;

        Ok(CanonicalEvent {
            kind,
            room_id,
            sender,
            privilege_tier: tier,
            identity_role: IdentityRole::Normal,
            text: None,
            monetary_value: pricing::membership_value(m),
            item_name: Some(tier.membership_label().to_string()),
            item_count: Some(m.num),
            item_image: Some(self.skins.resolve(tier).to_string()),
            created_at: created_at(m.timestamp, received_at),
        })
    }
}

fn normalize_chat(
    room_id: RoomId,
    chat: &ChatMessage,
    received_at: Timestamp,
) -> Result<CanonicalEvent, NormalizeError> {
    let sender = sender(EventKind::Chat, &chat.uname, chat.uid, &chat.face, chat.medal_level)?;

    Ok(CanonicalEvent {
        kind: EventKind::Chat,
        room_id,
        sender,
        privilege_tier: PrivilegeTier::from_code(chat.privilege_type),
        identity_role: IdentityRole::derive(chat.admin, chat.privilege_type),
        text: Some(chat.msg.clone()),
        monetary_value: 0.0,
        item_name: None,
        item_count: None,
        item_image: None,
        created_at: created_at(chat.timestamp, received_at),
    })
}

fn normalize_paid_message(
    room_id: RoomId,
    paid: &PaidMessage,
    received_at: Timestamp,
) -> Result<CanonicalEvent, NormalizeError> {
    let sender = sender(
        EventKind::PaidMessage,
        &paid.uname,
        paid.uid,
        &paid.face,
        paid.medal_level,
    )?;

    Ok(CanonicalEvent {
        kind: EventKind::PaidMessage,
        room_id,
        sender,
        privilege_tier: PrivilegeTier::from_code(paid.privilege_type),
        identity_role: IdentityRole::derive(paid.admin, paid.privilege_type),
        text: Some(paid.message.clone()),
        monetary_value: pricing::paid_message_value(paid.price),
        item_name: None,
        item_count: None,
        item_image: None,
        created_at: created_at(paid.timestamp, received_at),
    })
}

fn normalize_gift(
    room_id: RoomId,
    gift: &GiftMessage,
    received_at: Timestamp,
) -> Result<CanonicalEvent, NormalizeError> {
    let sender = sender(EventKind::Gift, &gift.uname, gift.uid, &gift.face, gift.medal_level)?;

    Ok(CanonicalEvent {
        kind: EventKind::Gift,
        room_id,
        sender,
        privilege_tier: PrivilegeTier::from_code(gift.privilege_type),
        identity_role: IdentityRole::Normal,
        text: None,
        monetary_value: pricing::gift_value(gift),
        item_name: Some(gift.gift_name.clone()),
        item_count: Some(gift.num),
        item_image: None,
        created_at: created_at(gift.timestamp, received_at),
    })
}

fn sender(
    kind: EventKind,
    name: &str,
    uid: Option<u64>,
    face: &str,
    fan_level: u32,
) -> Result<Sender, NormalizeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NormalizeError::missing_sender(kind.as_str()));
    }

    Ok(Sender {
        name: name.to_string(),
        // uid 0 is how the upstream marks anonymous senders
        uid: uid.filter(|&u| u != 0).map(Uid::new),
        avatar: if face.is_empty() {
            None
        } else {
            Some(face.to_string())
        },
        fan_level,
    })
}

fn created_at(upstream: Option<i64>, received_at: Timestamp) -> Timestamp {
    upstream
        .filter(|&secs| secs > 0)
        .map(Timestamp::from_unix_secs)
        .unwrap_or(received_at)
}
