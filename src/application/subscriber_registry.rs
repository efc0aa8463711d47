//! Per-room subscriber sets with isolated fan-out.
//!
//! ```text
//! Room: 12345          Room: 67890
//! ├── conn-a           └── conn-d
//! ├── conn-b
//! └── conn-c
//! ```
//!
//! A broadcast to room 12345 sends to a, b and c concurrently. If b fails
//! or stalls past the send timeout, b is evicted and a and c still receive
//! the payload.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConnectionId, RoomId};
use crate::ports::{DeliveryError, SubscriberConnection};

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: Vec<(ConnectionId, DeliveryError)>,
}

/// Registry of live viewer connections keyed by room.
///
/// # Thread Safety
///
/// Uses `RwLock` since broadcasts (reads) vastly outnumber joins and
/// leaves (writes). The lock is never held while a send is in flight.
pub struct SubscriberRegistry {
    rooms: RwLock<HashMap<RoomId, HashMap<ConnectionId, Arc<dyn SubscriberConnection>>>>,
    send_timeout: Duration,
}

impl SubscriberRegistry {
    pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a registry whose sends are each bounded by `send_timeout`.
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            send_timeout,
        }
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Registers `connection` under `room_id`.
    ///
    /// Joining twice with the same connection id replaces the earlier entry.
    pub async fn join(&self, room_id: RoomId, connection: Arc<dyn SubscriberConnection>) {
        let connection_id = connection.id();
        self.rooms
            .write()
            .await
            .entry(room_id)
            .or_default()
            .insert(connection_id, connection);

        tracing::debug!(room_id = %room_id, connection_id = %connection_id, "Subscriber joined");
    }

    /// Removes a registration. Returns false when it was not present.
    pub async fn leave(&self, room_id: RoomId, connection_id: ConnectionId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(members) = rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = members.remove(&connection_id).is_some();
        if members.is_empty() {
            rooms.remove(&room_id);
        }
        if removed {
            tracing::debug!(room_id = %room_id, connection_id = %connection_id, "Subscriber left");
        }
        removed
    }

    /// Sends `payload` once to every subscriber of `room_id`.
    ///
    /// Iterates a snapshot of the room's members. Every connection whose
    /// send fails or times out is evicted and closed; the rest are
    /// unaffected. A room without subscribers is a no-op.
    pub async fn broadcast(&self, room_id: RoomId, payload: &str) -> BroadcastReport {
        let snapshot: Vec<Arc<dyn SubscriberConnection>> = {
            let rooms = self.rooms.read().await;
            match rooms.get(&room_id) {
                Some(members) => members.values().cloned().collect(),
                None => return BroadcastReport::default(),
            }
        };

        let send_timeout = self.send_timeout;
        let results = join_all(snapshot.iter().map(|connection| async move {
            let outcome = match tokio::time::timeout(send_timeout, connection.send(payload)).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(send_timeout)),
            };
            (connection, outcome)
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (connection, outcome) in results {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    report.evicted.push((connection.id(), error));
                    failed.push(Arc::clone(connection));
                }
            }
        }

        if !failed.is_empty() {
            self.evict(room_id, &failed).await;
        }

        report
    }

    /// Evicts and closes every subscriber of `room_id`. Returns how many
    /// were closed.
    pub async fn close_room(&self, room_id: RoomId) -> usize {
        let members = self.rooms.write().await.remove(&room_id);
        let Some(members) = members else {
            return 0;
        };

        let count = members.len();
        join_all(members.values().map(|connection| connection.close())).await;
        tracing::info!(room_id = %room_id, closed = count, "Closed room subscribers");
        count
    }

    pub async fn subscriber_count(&self, room_id: RoomId) -> usize {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    async fn evict(&self, room_id: RoomId, failed: &[Arc<dyn SubscriberConnection>]) {
        {
            let mut rooms = self.rooms.write().await;
            if let Some(members) = rooms.get_mut(&room_id) {
                for connection in failed {
                    members.remove(&connection.id());
                }
                if members.is_empty() {
                    rooms.remove(&room_id);
                }
            }
        }

        for connection in failed {
            tracing::warn!(
                room_id = %room_id,
                connection_id = %connection.id(),
                "Evicting subscriber after failed send"
            );
            connection.close().await;
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEND_TIMEOUT)
    }
}
