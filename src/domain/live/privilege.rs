//! Privilege tiers and identity roles of event senders.

use serde::{Deserialize, Serialize};

/// Paid membership rank a viewer holds in a room.
///
/// Upstream codes: 0 → none, 1 → governor, 2 → admiral, 3 → captain.
/// Unknown codes map to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeTier {
    #[default]
    None,
    Governor,
    Admiral,
    Captain,
}

impl PrivilegeTier {
    /// Privilege code the chat handler treats as the broadcaster marker.
    pub const BROADCASTER_CODE: u8 = 1;

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => PrivilegeTier::Governor,
            2 => PrivilegeTier::Admiral,
            3 => PrivilegeTier::Captain,
            _ => PrivilegeTier::None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PrivilegeTier::None => "none",
            PrivilegeTier::Governor => "governor",
            PrivilegeTier::Admiral => "admiral",
            PrivilegeTier::Captain => "captain",
        }
    }

    /// Item name of a membership event bought at this tier.
    ///
    /// A purchase always carries a tier, so `None` here means the upstream
    /// sent a code outside the table.
    pub fn membership_label(&self) -> &'static str {
        match self {
            PrivilegeTier::None => "unknown",
            tier => tier.label(),
        }
    }
}

/// Role of a sender in the room, independent of [`PrivilegeTier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityRole {
    #[default]
    Normal,
    Moderator,
    Broadcaster,
}

impl IdentityRole {
    /// Moderator wins over broadcaster; both override normal.
    pub fn derive(admin: bool, privilege_code: u8) -> Self {
        if admin {
            IdentityRole::Moderator
        } else if privilege_code == PrivilegeTier::BROADCASTER_CODE {
            IdentityRole::Broadcaster
        } else {
            IdentityRole::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdentityRole::Normal => "normal",
            IdentityRole::Moderator => "moderator",
            IdentityRole::Broadcaster => "broadcaster",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_codes_map_to_fixed_table() {
        assert_eq!(PrivilegeTier::from_code(0), PrivilegeTier::None);
        assert_eq!(PrivilegeTier::from_code(1), PrivilegeTier::Governor);
        assert_eq!(PrivilegeTier::from_code(2), PrivilegeTier::Admiral);
        assert_eq!(PrivilegeTier::from_code(3), PrivilegeTier::Captain);
    }

    #[test]
    fn unknown_privilege_code_is_none() {
        assert_eq!(PrivilegeTier::from_code(9), PrivilegeTier::None);
    }

    #[test]
    fn unknown_membership_tier_is_labelled_unknown() {
        assert_eq!(PrivilegeTier::from_code(7).membership_label(), "unknown");
        assert_eq!(PrivilegeTier::Admiral.membership_label(), "admiral");
        assert_eq!(PrivilegeTier::None.label(), "none");
    }

    #[test]
    fn admin_flag_yields_moderator_even_with_broadcaster_code() {
        assert_eq!(IdentityRole::derive(true, 1), IdentityRole::Moderator);
    }

    #[test]
    fn broadcaster_code_without_admin_yields_broadcaster() {
        assert_eq!(IdentityRole::derive(false, 1), IdentityRole::Broadcaster);
        assert_eq!(IdentityRole::derive(false, 3), IdentityRole::Normal);
    }

    #[test]
    fn tiers_serialize_in_snake_case() {
        let json = serde_json::to_string(&PrivilegeTier::Captain).unwrap();
        assert_eq!(json, "\"captain\"");
    }
}
