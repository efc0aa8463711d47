//! Static resource references served alongside events.

use serde::Deserialize;

use crate::domain::live::MembershipSkinTable;

/// Membership tier images. Blank entries use the built-in images.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcesConfig {
    #[serde(default)]
    pub guard_common: String,
    #[serde(default)]
    pub guard_captain: String,
    #[serde(default)]
    pub guard_admiral: String,
    #[serde(default)]
    pub guard_governor: String,
}

impl ResourcesConfig {
    pub fn skin_table(&self) -> MembershipSkinTable {
        MembershipSkinTable::new(
            self.guard_common.clone(),
            self.guard_captain.clone(),
            self.guard_admiral.clone(),
            self.guard_governor.clone(),
        )
    }
}
