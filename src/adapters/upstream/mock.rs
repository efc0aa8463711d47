//! Mock upstream client for testing.
//!
//! Opens in-process "connections" backed by channels so tests can inject
//! typed events into a room and observe connects and disconnects.
//!
//! # Example
//!
//! ```ignore
//! let upstream = Arc::new(MockUpstreamClient::new());
//! manager.start_listening(room_id, None).await?;
//! upstream.emit(room_id, UpstreamEvent::Chat(chat)).await;
//! assert_eq!(upstream.disconnect_count(room_id), 0);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::domain::foundation::{Credential, RoomId};
use crate::domain::live::UpstreamEvent;
use crate::ports::{UpstreamClient, UpstreamConnection, UpstreamError, UpstreamHandle};

const EVENT_BUFFER: usize = 64;

/// One recorded connect call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRecord {
    pub room_id: RoomId,
    pub authenticated: bool,
}

#[derive(Default)]
struct MockState {
    connects: Vec<ConnectRecord>,
    disconnects: HashMap<RoomId, usize>,
    open: HashMap<RoomId, mpsc::Sender<UpstreamEvent>>,
    next_error: Option<UpstreamError>,
}

/// Channel-backed upstream client.
#[derive(Clone, Default)]
pub struct MockUpstreamClient {
    state: Arc<Mutex<MockState>>,
}

impl MockUpstreamClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next connect call fail with `error`.
    pub fn fail_next_connect(&self, error: UpstreamError) {
        self.lock().next_error = Some(error);
    }

    /// Delivers `event` on the room's open connection.
    ///
    /// Returns false when the room is not connected.
    pub async fn emit(&self, room_id: RoomId, event: UpstreamEvent) -> bool {
        let sender = self.lock().open.get(&room_id).cloned();
        match sender {
            Some(sender) => sender.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Ends the room's event stream as an upstream disconnect would.
    pub fn end_stream(&self, room_id: RoomId) {
        self.lock().open.remove(&room_id);
    }

    pub fn connects(&self) -> Vec<ConnectRecord> {
        self.lock().connects.clone()
    }

    pub fn disconnect_count(&self, room_id: RoomId) -> usize {
        self.lock().disconnects.get(&room_id).copied().unwrap_or(0)
    }

    pub fn is_connected(&self, room_id: RoomId) -> bool {
        self.lock().open.contains_key(&room_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct MockHandle {
    room_id: RoomId,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl UpstreamHandle for MockHandle {
    async fn disconnect(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        *state.disconnects.entry(self.room_id).or_default() += 1;
        state.open.remove(&self.room_id);
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn connect(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Result<UpstreamConnection, UpstreamError> {
        let mut state = self.lock();
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state.connects.push(ConnectRecord {
            room_id,
            authenticated: credential.is_some(),
        });
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        state.open.insert(room_id, tx);

        Ok(UpstreamConnection {
            events: rx,
            handle: Box::new(MockHandle {
                room_id,
                state: Arc::clone(&self.state),
            }),
        })
    }
}
