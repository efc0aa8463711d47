//! UpstreamClient port - Interface to the room wire-protocol client.
//!
//! The wire client owns framing, compression and the handshake. This crate
//! only asks it to connect to a room, reads typed events from the returned
//! channel, and tells it to disconnect.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::foundation::{Credential, RoomId};
use crate::domain::live::UpstreamEvent;

/// Errors reported when opening an upstream room connection.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Network failure while connecting
    #[error("Upstream connection failed: {0}")]
    Connect(String),

    /// The upstream refused the supplied credential
    #[error("Upstream rejected credential: {0}")]
    Rejected(String),

    /// The room does not exist upstream
    #[error("Room {0} not found upstream")]
    RoomNotFound(RoomId),
}

/// Handle to one open upstream connection.
///
/// Exclusively owned by the session that opened it.
#[async_trait]
pub trait UpstreamHandle: Send + Sync {
    /// Closes the connection and any session the client opened for it.
    ///
    /// Called exactly once per handle.
    async fn disconnect(&mut self);
}

/// A freshly opened room connection.
///
/// The event channel closes when the upstream connection ends for good.
pub struct UpstreamConnection {
    pub events: mpsc::Receiver<UpstreamEvent>,
    pub handle: Box<dyn UpstreamHandle>,
}

impl std::fmt::Debug for UpstreamConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConnection").finish_non_exhaustive()
    }
}

/// Port for the room wire-protocol client.
///
/// # Example
///
/// ```ignore
/// let mut conn = client.connect(room_id, credential.as_ref()).await?;
/// while let Some(event) = conn.events.recv().await {
///     handle(event).await;
/// }
/// conn.handle.disconnect().await;
/// ```
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Opens an authenticated connection when `credential` is present,
    /// an anonymous one otherwise.
    async fn connect(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<UpstreamConnection, UpstreamError>;
}
