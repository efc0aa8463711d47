//! Opaque upstream session credential.

use secrecy::{ExposeSecret, Secret};
use std::fmt;

/// Session token used to listen to a room as an authenticated user.
///
/// Never empty. The token is redacted from `Debug` and `Display` output.
#[derive(Clone)]
pub struct Credential(Secret<String>);

impl Credential {
    /// Wraps a raw token; blank input yields `None` (anonymous listen).
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Secret::new(trimmed.to_string())))
    }

    /// Converts an optional request field into an optional credential.
    pub fn from_optional(raw: Option<String>) -> Option<Self> {
        raw.and_then(Self::new)
    }

    /// Exposes the token (for building upstream requests).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
