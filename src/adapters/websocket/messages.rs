//! WebSocket control messages.
//!
//! Room events are sent as bare canonical event objects (they carry a
//! `kind` field). Control messages carry a `type` field instead.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::RoomId;

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive; answered with `pong`.
    Ping,
}

/// Control messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame after a successful join.
    Connected {
        room_id: RoomId,
        connection_id: String,
        timestamp: String,
    },
    Pong,
    /// The join failed; the server closes right after.
    Error { message: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
