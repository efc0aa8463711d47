//! Image references for membership tiers.

use super::privilege::PrivilegeTier;

const BUILTIN_COMMON: &str = "/static/guard/common.png";
const BUILTIN_CAPTAIN: &str = "/static/guard/captain.png";
const BUILTIN_ADMIRAL: &str = "/static/guard/admiral.png";
const BUILTIN_GOVERNOR: &str = "/static/guard/governor.png";

/// Tier → image table. Empty entries fall back to the built-in images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSkinTable {
    common: String,
    captain: String,
    admiral: String,
    governor: String,
}

impl MembershipSkinTable {
    /// Builds a table from configured entries, substituting built-ins for blanks.
    pub fn new(
        common: impl Into<String>,
        captain: impl Into<String>,
        admiral: impl Into<String>,
        governor: impl Into<String>,
    ) -> Self {
        fn or_builtin(value: String, builtin: &str) -> String {
            if value.trim().is_empty() {
                builtin.to_string()
            } else {
                value
            }
        }

        Self {
            common: or_builtin(common.into(), BUILTIN_COMMON),
            captain: or_builtin(captain.into(), BUILTIN_CAPTAIN),
            admiral: or_builtin(admiral.into(), BUILTIN_ADMIRAL),
            governor: or_builtin(governor.into(), BUILTIN_GOVERNOR),
        }
    }

    pub fn builtin() -> Self {
        Self::new("", "", "", "")
    }

    pub fn resolve(&self, tier: PrivilegeTier) -> &str {
        match tier {
            PrivilegeTier::None => &self.common,
            PrivilegeTier::Captain => &self.captain,
            PrivilegeTier::Admiral => &self.admiral,
            PrivilegeTier::Governor => &self.governor,
        }
    }
}

impl Default for MembershipSkinTable {
    fn default() -> Self {
        Self::builtin()
    }
}
