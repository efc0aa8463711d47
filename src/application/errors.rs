//! Listener errors and failure reports.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::foundation::{ConnectionId, DomainError, RoomId};
use crate::domain::live::NormalizeError;
use crate::ports::{DeliveryError, LookupError, UpstreamError};

/// Errors returned to callers of the listener control surface.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to start listening to room {room_id}: {source}")]
    Upstream {
        room_id: RoomId,
        #[source]
        source: UpstreamError,
    },
}

impl ListenerError {
    pub fn upstream(room_id: RoomId, source: UpstreamError) -> Self {
        ListenerError::Upstream { room_id, source }
    }
}

/// Failure observed inside a background task.
///
/// None of these stop the listener. They are logged and, when a sink is
/// attached, pushed to it so callers can observe them.
#[derive(Debug, Clone)]
pub enum ListenerFailure {
    /// An upstream event was dropped during classification
    Normalize {
        room_id: RoomId,
        error: NormalizeError,
    },

    /// A subscriber was evicted after a failed send
    Delivery {
        room_id: RoomId,
        connection_id: ConnectionId,
        error: DeliveryError,
    },

    /// A history write failed
    Persistence {
        room_id: RoomId,
        table: &'static str,
        error: DomainError,
    },

    /// Room metadata could not be resolved or stored
    Metadata { room_id: RoomId, reason: String },

    /// Avatar backfill gave up
    ProfileLookup { room_id: RoomId, error: LookupError },

    /// The upstream event stream ended without a stop request
    UpstreamClosed { room_id: RoomId },
}

impl ListenerFailure {
    pub fn room_id(&self) -> RoomId {
        match self {
            ListenerFailure::Normalize { room_id, .. }
            | ListenerFailure::Delivery { room_id, .. }
            | ListenerFailure::Persistence { room_id, .. }
            | ListenerFailure::Metadata { room_id, .. }
            | ListenerFailure::ProfileLookup { room_id, .. }
            | ListenerFailure::UpstreamClosed { room_id } => *room_id,
        }
    }
}

/// Optional channel that background tasks report failures to.
#[derive(Debug, Clone, Default)]
pub struct FailureSink {
    tx: Option<mpsc::UnboundedSender<ListenerFailure>>,
}

impl FailureSink {
    /// A sink plus the receiver its reports arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ListenerFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every report.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn report(&self, failure: ListenerFailure) {
        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is watching any more.
            let _ = tx.send(failure);
        }
    }
}
