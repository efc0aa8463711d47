//! WebSocket upgrade handler for room subscribers.
//!
//! Connection lifecycle:
//! 1. Parse the room id and upgrade
//! 2. Join the room (starting an anonymous listen when needed)
//! 3. Forward queued room events until either side closes
//! 4. Leave the room

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use crate::application::RoomListenerManager;
use crate::domain::foundation::{RoomId, Timestamp};
use crate::ports::SubscriberConnection;

use super::messages::{ClientMessage, ServerMessage};
use super::subscriber::{OutboundFrame, QueuedSubscriber};

pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub listener: Arc<RoomListenerManager>,
    /// Frames buffered per connection before sends start waiting.
    pub outbound_capacity: usize,
}

impl WebSocketState {
    pub fn new(listener: Arc<RoomListenerManager>) -> Self {
        Self {
            listener,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }
}

/// Handle WebSocket upgrade requests for a room's event stream.
///
/// Route: `GET /api/ws/:room_id`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<WebSocketState>,
) -> Response {
    let room_id: RoomId = match room_id.parse() {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid room ID").into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, room_id, state))
}

async fn handle_socket(socket: WebSocket, room_id: RoomId, state: WebSocketState) {
    let (mut sink, mut stream) = socket.split();

    let (subscriber, mut outbound) = QueuedSubscriber::new(state.outbound_capacity);
    let subscriber = Arc::new(subscriber);
    let connection_id = subscriber.id();

    if let Err(e) = state.listener.join(room_id, subscriber.clone()).await {
        tracing::warn!(room_id = %room_id, error = %e, "Subscriber join failed");
        let error = ServerMessage::Error {
            message: e.to_string(),
        };
        let _ = send_control(&mut sink, &error).await;
        let _ = sink.send(Message::Close(None)).await;
        return;
    }

    let connected = ServerMessage::Connected {
        room_id,
        connection_id: connection_id.to_string(),
        timestamp: Timestamp::now().as_datetime().to_rfc3339(),
    };
    if let Err(e) = send_control(&mut sink, &connected).await {
        tracing::debug!(connection_id = %connection_id, "Failed to send connected message: {}", e);
        state.listener.leave(room_id, connection_id).await;
        return;
    }

    // Forward queued frames to the socket; the close frame always comes last
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Answer keepalives until the client goes away
    let replies = subscriber.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => {
                        if let Ok(pong) = ServerMessage::Pong.to_json() {
                            let _ = replies.send(&pong).await;
                        }
                    }
                    Err(_) => {
                        tracing::trace!(connection_id = %connection_id, "Ignoring unknown client message");
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.listener.leave(room_id, connection_id).await;
    subscriber.close().await;
    tracing::debug!(room_id = %room_id, connection_id = %connection_id, "Subscriber disconnected");
}

async fn send_control(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = msg.to_json().map_err(axum::Error::new)?;
    sink.send(Message::Text(json)).await
}
