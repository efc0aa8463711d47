//! Bounded avatar backfill for events that arrive without one.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::Credential;
use crate::domain::live::CanonicalEvent;
use crate::ports::{LookupError, ProfileLookup};

pub struct AvatarBackfill {
    profiles: Arc<dyn ProfileLookup>,
    timeout: Duration,
}

impl AvatarBackfill {
    pub fn new(profiles: Arc<dyn ProfileLookup>, timeout: Duration) -> Self {
        Self { profiles, timeout }
    }

    /// Fills in the sender avatar when it is missing and the sender is known.
    ///
    /// On failure or timeout the event is left untouched (empty avatar).
    pub async fn fill(
        &self,
        event: &mut CanonicalEvent,
        credential: Option<&Credential>,
    ) -> Result<(), LookupError> {
        if !event.needs_avatar() {
            return Ok(());
        }
        let Some(uid) = event.sender.uid else {
            return Ok(());
        };

        let avatar = tokio::time::timeout(self.timeout, self.profiles.avatar(uid, credential))
            .await
            .unwrap_or(Err(LookupError::Timeout))?;

        if let Some(avatar) = avatar.filter(|a| !a.is_empty()) {
            tracing::debug!(uid = %uid, "Backfilled sender avatar");
            event.sender.avatar = Some(avatar);
        }
        Ok(())
    }
}
