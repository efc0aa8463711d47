//! RoomInfoProvider port - Side lookups of room title and host.

use async_trait::async_trait;

use crate::domain::foundation::{Credential, RoomId, Uid};

/// Errors from the upstream web API lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Request failed before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-zero business code
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The API asked us to slow down
    #[error("Rate limited by upstream API")]
    RateLimited,

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The lookup exceeded its time bound
    #[error("Lookup timed out")]
    Timeout,
}

/// Basic room information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub title: String,
    pub host_uid: Option<Uid>,
}

/// Port for resolving room metadata.
///
/// Lookups reuse the credential's session when present and fall back to an
/// anonymous request otherwise.
#[async_trait]
pub trait RoomInfoProvider: Send + Sync {
    async fn room_info(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<RoomInfo, LookupError>;

    /// Display name of a room host.
    async fn host_name(
        &self,
        host_uid: Uid,
        credential: Option<&Credential>,
    ) -> Result<String, LookupError>;
}
