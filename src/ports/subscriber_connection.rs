//! SubscriberConnection port - One live outbound channel to a viewer.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::ConnectionId;

/// Errors that can occur delivering a payload to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The remote side is gone
    #[error("Subscriber connection closed")]
    Closed,

    /// The send did not complete within the per-send bound
    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-specific failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Port for a bidirectional viewer connection owned by the transport layer.
///
/// Implementations must make `send` cancel-safe: the registry wraps every
/// send in a timeout and drops the future when it fires.
#[async_trait]
pub trait SubscriberConnection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Attempts a single delivery of a serialized canonical event.
    async fn send(&self, payload: &str) -> Result<(), DeliveryError>;

    /// Closes the connection. Idempotent.
    async fn close(&self);
}
