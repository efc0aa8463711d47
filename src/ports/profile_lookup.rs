//! ProfileLookup port - Public profile data of event senders.

use async_trait::async_trait;

use crate::domain::foundation::{Credential, Uid};

use super::LookupError;

/// Port for fetching a sender's public profile.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Avatar URL of `uid`, `None` when the profile has none.
    async fn avatar(
        &self,
        uid: Uid,
        credential: Option<&Credential>,
    ) -> Result<Option<String>, LookupError>;
}
